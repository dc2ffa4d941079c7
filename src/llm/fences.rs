//! Strips common Markdown code-fence framings (SPEC_FULL §4.5: "the
//! adapter strips common code-fence framings before parsing").

pub fn strip_code_fences(raw: &str) -> &str {
    let trimmed = raw.trim();
    let Some(after_open) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    let after_open = after_open.strip_prefix("json").unwrap_or(after_open);
    let after_open = after_open.trim_start_matches('\n');
    after_open.strip_suffix("```").map_or(after_open, str::trim_end)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_plain_fence() {
        assert_eq!(strip_code_fences("```\n{\"a\":1}\n```"), "{\"a\":1}");
    }

    #[test]
    fn strips_json_tagged_fence() {
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
    }

    #[test]
    fn leaves_unfenced_text_alone() {
        assert_eq!(strip_code_fences("{\"a\":1}"), "{\"a\":1}");
    }
}
