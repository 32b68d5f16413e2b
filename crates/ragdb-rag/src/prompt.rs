/// Compose the model prompt for `question`.
///
/// Without context the question is sent as-is; otherwise the retrieved texts
/// are joined by blank lines and placed ahead of the question.
pub fn build_prompt(question: &str, contexts: &[String]) -> String {
    if contexts.is_empty() {
        return question.to_string();
    }
    let context = contexts.join("\n\n");
    format!(
        "Answer the question using the documents below.\n\nDocuments:\n{}\n\nQuestion: {}\n\nAnswer:",
        context, question
    )
}
