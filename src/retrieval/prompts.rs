use std::fmt::Write;

use crate::search::RetrievalResult;

pub const SYSTEM_PROMPT: &str = "\
You are a recruiting assistant that screens résumés. Answer questions using ONLY \
the résumé passages provided below.

IMPORTANT INSTRUCTIONS:
1. Base every statement on the supplied passages and nothing else.
2. If the passages do not contain the information, say clearly that it is not available.
3. Name the candidates your answer refers to.
4. Review every supplied passage before answering; do not stop at the first match.
5. For questions about skills, experience or education, mention every relevant candidate.
6. Keep the answer structured, clear and professional.

Never invent information that is not in the passages.";

pub const NO_CONTEXT_MARKER: &str =
    "No relevant information was found in the résumés for this question.";

/// Context blocks numbered per candidate, followed by the question
#[inline]
pub fn user_prompt(query: &str, results: &[RetrievalResult]) -> String {
    let mut context = String::new();

    if results.is_empty() {
        context.push_str(NO_CONTEXT_MARKER);
    } else {
        context.push_str("CANDIDATE PASSAGES:\n\n");
        for (idx, result) in results.iter().enumerate() {
            let _ = write!(
                context,
                "Candidate {} ({}):\n{}\n\n",
                idx + 1,
                result.metadata.display_name,
                result.content
            );
        }
    }

    format!(
        "CONTEXT:\n{}\n\nQUESTION:\n{}\n\n\
         Answer the question using ONLY the information above. \
         If it is not sufficient, say so clearly.",
        context.trim_end(),
        query
    )
}

/// Full prompt sent to the generation client
#[inline]
pub fn build_prompt(query: &str, results: &[RetrievalResult]) -> String {
    format!("{}\n\n{}", SYSTEM_PROMPT, user_prompt(query, results))
}
