//! Prompt templates sent to the model.
//!
//! Summaries and translations are both two-turn exchanges: the first turn
//! describes the task, the second carries the text. Keeping the wording
//! here leaves [`crate::processor`] free of string plumbing.

use crate::config::Lang;

/// First turn of a summary request.
pub fn summary_task(words: usize, lang: &Lang) -> String {
    format!(
        "In the next turn of conversation, you will be given a few paragraphs of an article. \
         You are supposed to write a summary about them within {words} words. \
         The language must be {}. \
         The summary must be clear, explicit, easily-understood, fluent and smooth.",
        lang.display_name()
    )
}

/// Second turn of a summary request: the requirements again, then the text.
pub fn summary_request<T: AsRef<str>>(words: usize, lang: &Lang, paragraphs: &[T]) -> String {
    let mut text = format!(
        "I want to emphasize again, your returned summary must be in {}, \
         within {words} words, clear and fluent. The paragraphs are as follows:",
        lang.display_name()
    );
    for paragraph in paragraphs {
        text.push_str("\n ");
        text.push_str(paragraph.as_ref());
    }
    text
}

/// First turn of a translation request.
pub fn translation_task(lang: &Lang) -> String {
    format!(
        "In the next turn of conversation, you will be given a piece of text. \
         Translate it into {}. Reply with the translation only: \
         no explanations, notes, quotation marks or anything else.",
        lang.display_name()
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_prompts_carry_budget_and_language() {
        let lang = Lang::new("zh-CN");
        let task = summary_task(200, &lang);
        assert!(task.contains("within 200 words"));
        assert!(task.contains("simplified Chinese"));

        let request = summary_request(200, &lang, &["First.", "Second."][..]);
        assert!(request.contains("within 200 words"));
        assert!(request.ends_with("follows:\n First.\n Second."));
    }

    #[test]
    fn test_translation_task_forbids_extra_output() {
        let task = translation_task(&Lang::new("fr"));
        assert!(task.contains("into French"));
        assert!(task.contains("translation only"));
    }
}
