//! Prompt construction for commit message generation.

/// Build the prompt that asks a backend for a conventional commit message.
///
/// `diff` must already be cleaned; it is embedded verbatim.
pub fn build_commit_prompt(diff: &str) -> String {
    format!(
        r#"You are a helpful assistant that writes semantic Git commit messages.

Format:
- feat(scope): new feature
- fix(scope): bug fix
- refactor(scope): code cleanup
- chore(scope): config or tooling changes

Only return the commit message. No extra text.

Git diff:
```diff
{diff}
```"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_embeds_diff_in_fence() {
        let prompt = build_commit_prompt("+pub fn new_function() {}");
        assert!(prompt.contains("```diff\n+pub fn new_function() {}\n```"));
    }

    #[test]
    fn test_prompt_lists_commit_types() {
        let prompt = build_commit_prompt("");
        for prefix in ["feat(scope):", "fix(scope):", "refactor(scope):", "chore(scope):"] {
            assert!(prompt.contains(prefix), "missing {prefix}");
        }
        assert!(prompt.contains("Only return the commit message"));
    }

    #[test]
    fn test_prompt_does_not_interpret_braces() {
        let prompt = build_commit_prompt("+let s = format!(\"{x}\");");
        assert!(prompt.contains("format!(\"{x}\")"));
    }
}
