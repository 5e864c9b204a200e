//! Prompt templates for session Q&A, summaries and topic extraction
//!
//! The Q&A and topic prompts are Greek because the transcripts are; the model
//! is told to answer in Greek. The summary prompt is English.

use crate::config::RetrievalConfig;
use crate::types::{ChatMessage, ScoredChunk};

/// First `max_chars` characters of `text`
pub fn truncate_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

/// Prompt builder for the generative backend
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    /// Character budget for document text
    max_context_chars: usize,
    /// Trailing chat turns kept in Q&A prompts
    history_window: usize,
}

impl PromptBuilder {
    pub fn new(max_context_chars: usize, history_window: usize) -> Self {
        Self {
            max_context_chars,
            history_window,
        }
    }

    pub fn from_config(config: &RetrievalConfig) -> Self {
        Self::new(config.max_context_chars, config.history_window)
    }

    /// Join retrieved chunks in rank order
    pub fn build_context(chunks: &[ScoredChunk]) -> String {
        chunks
            .iter()
            .map(|c| c.chunk.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Render the trailing chat turns, one `Role: content` line each
    pub fn format_history(&self, history: &[ChatMessage]) -> String {
        let skip = history.len().saturating_sub(self.history_window);
        history[skip..]
            .iter()
            .map(|msg| {
                let role = if msg.is_user() { "Χρήστης" } else { "Βοηθός" };
                format!("{}: {}", role, msg.content)
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Build the grounded Q&A prompt
    pub fn qa_prompt(&self, context: &str, history: &[ChatMessage], question: &str) -> String {
        format!(
            r#"Είσαι ένας βοηθός που βοηθά τους χρήστες να κατανοήσουν τα πρακτικά των συνεδριάσεων της Βουλής των Αντιπροσώπων της Κύπρου.

Οδηγίες:
1. Χρησιμοποίησε μόνο τις πληροφορίες που παρέχονται στο παρακάτω κείμενο για να απαντήσεις στην ερώτηση
2. Αν η πληροφορία δεν υπάρχει στο κείμενο, απάντησε "Δεν μπορώ να βρω αυτή την πληροφορία στα πρακτικά της συνεδρίασης"
3. Απάντησε στα Ελληνικά με σαφή και κατανοητό τρόπο
4. Αν χρειάζεται να αναφέρεις αριθμούς ή ημερομηνίες, γράψε τους με ακρίβεια
5. Αν αναφέρεσαι σε βουλευτές, χρησιμοποίησε το πλήρες όνομα και την ιδιότητά τους

Σχετικό κείμενο από τη συνεδρίαση:
{context}

Προηγούμενη συζήτηση:
{history}

Ερώτηση: {question}

Απάντηση:"#,
            context = truncate_chars(context, self.max_context_chars),
            history = self.format_history(history),
            question = question
        )
    }

    /// Build the markdown session summary prompt
    pub fn summary_prompt(&self, transcript: &str) -> String {
        format!(
            r#"Based on the following parliamentary session transcript, please provide a summary including:
1. Main topics discussed - an emphasis on the discussion around legislation
2. Notable debates or disagreements
3. Key decisions made
4. Voting results with the number of votes for and against

Format the response in markdown with clear headings and bullet points.

Transcript:
{transcript}"#,
            transcript = truncate_chars(transcript, self.max_context_chars)
        )
    }

    /// Build the whole-transcript legislative topics prompt
    pub fn topics_prompt(&self, transcript: &str) -> String {
        format!(
            "Ανάλυσε το παρακάτω κείμενο της κοινοβουλευτικής συνεδρίασης και εντόπισε όλα τα νομοθετικά θέματα.\n\n{}\n\nΚείμενο συνεδρίασης:\n{}",
            TOPIC_LAYOUT,
            truncate_chars(transcript, self.max_context_chars)
        )
    }

    /// Build the topics prompt over pre-split legislative sections
    ///
    /// The character budget is shared evenly between sections.
    pub fn sectioned_topics_prompt(&self, sections: &[String]) -> String {
        let share = self.max_context_chars / sections.len().max(1);

        let mut listed = String::new();
        for (i, section) in sections.iter().enumerate() {
            listed.push_str(&format!(
                "### Ενότητα {}\n{}\n\n",
                i + 1,
                truncate_chars(section.trim(), share)
            ));
        }

        format!(
            "Το παρακάτω κείμενο κοινοβουλευτικής συνεδρίασης έχει χωριστεί σε {} ενότητες, μία για κάθε νομοσχέδιο. Ανάλυσε κάθε ενότητα ξεχωριστά.\n\n{}\n\nΕνότητες συνεδρίασης:\n{}",
            sections.len(),
            TOPIC_LAYOUT,
            listed.trim_end()
        )
    }
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::from_config(&RetrievalConfig::default())
    }
}

/// Per-topic fields and markdown layout requested from the model
const TOPIC_LAYOUT: &str = "Για κάθε θέμα που εντοπίζεις, παρέχε:
1. Τίτλο του νομοσχεδίου/πρότασης/τροπολογίας
2. Σκοπό (τι προσπαθεί να επιτύχει)
3. Προτεινόμενες αλλαγές (τι συγκεκριμένα προτείνεται να αλλάξει)
4. Αποτέλεσμα ψηφοφορίας (αν υπάρχει)

Μορφοποίησε την απάντηση σε markdown ως εξής:

## 1. [Τίτλος νομοσχεδίου]

### Σκοπός
[Περιγραφή σκοπού]

### Προτεινόμενες Αλλαγές
- [Αλλαγή 1]
- [Αλλαγή 2]

### Αποτέλεσμα
[Αποτέλεσμα ψηφοφορίας αν υπάρχει]";

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Chunk;

    fn turns(n: usize) -> Vec<ChatMessage> {
        (0..n)
            .map(|i| {
                if i % 2 == 0 {
                    ChatMessage::user(format!("ερώτηση {}", i))
                } else {
                    ChatMessage::assistant(format!("απάντηση {}", i))
                }
            })
            .collect()
    }

    #[test]
    fn test_truncate_chars_is_char_safe() {
        assert_eq!(truncate_chars("Βουλή", 3), "Βου");
        assert_eq!(truncate_chars("Βουλή", 5), "Βουλή");
        assert_eq!(truncate_chars("Βουλή", 50), "Βουλή");
        assert_eq!(truncate_chars("abc", 0), "");
    }

    #[test]
    fn test_history_keeps_last_three_turns() {
        let prompt = PromptBuilder::default().qa_prompt("κείμενο", &turns(5), "Τι ψηφίστηκε;");

        assert!(!prompt.contains("ερώτηση 0"));
        assert!(!prompt.contains("απάντηση 1"));
        assert!(prompt.contains("Χρήστης: ερώτηση 2"));
        assert!(prompt.contains("Βοηθός: απάντηση 3"));
        assert!(prompt.contains("Χρήστης: ερώτηση 4"));
    }

    #[test]
    fn test_unknown_role_renders_as_assistant() {
        let history = vec![ChatMessage {
            role: "system".to_string(),
            content: "γεια".to_string(),
        }];
        assert_eq!(PromptBuilder::default().format_history(&history), "Βοηθός: γεια");
    }

    #[test]
    fn test_qa_prompt_layout() {
        let context = PromptBuilder::build_context(&[
            ScoredChunk { chunk: Chunk::new(3, "πρώτο απόσπασμα"), score: 2 },
            ScoredChunk { chunk: Chunk::new(0, "δεύτερο απόσπασμα"), score: 1 },
        ]);
        assert_eq!(context, "πρώτο απόσπασμα\nδεύτερο απόσπασμα");

        let prompt = PromptBuilder::default().qa_prompt(&context, &[], "Ποιος μίλησε;");
        let context_at = prompt.find("πρώτο απόσπασμα").unwrap();
        let question_at = prompt.find("Ερώτηση: Ποιος μίλησε;").unwrap();
        assert!(context_at < question_at);
        assert!(prompt.ends_with("Απάντηση:"));
    }

    #[test]
    fn test_summary_prompt_truncates_transcript() {
        let builder = PromptBuilder::new(10, 3);
        let prompt = builder.summary_prompt(&"λ".repeat(50));
        assert!(prompt.ends_with(&format!("Transcript:\n{}", "λ".repeat(10))));
        assert!(prompt.contains("Voting results"));
    }

    #[test]
    fn test_sectioned_prompt_shares_budget() {
        let builder = PromptBuilder::new(20, 3);
        let sections = vec!["α".repeat(30), "β".repeat(5)];
        let prompt = builder.sectioned_topics_prompt(&sections);

        assert!(prompt.contains("σε 2 ενότητες"));
        assert!(prompt.contains(&format!("### Ενότητα 1\n{}\n", "α".repeat(10))));
        assert!(!prompt.contains(&"α".repeat(11)));
        assert!(prompt.ends_with(&format!("### Ενότητα 2\n{}", "β".repeat(5))));
        assert!(prompt.contains("### Προτεινόμενες Αλλαγές"));
    }
}
