use docrag_core::types::SearchResult;

pub fn build_prompt(query: &str, context: &str) -> String {
    format!(
        "Answer the question using the reference documents below.\n\
         If the documents are not related to the question, say so.\n\
         \n\
         Reference documents:\n\
         {context}\n\
         \n\
         Question: {query}\n\
         \n\
         Format your answer as:\n\
         1. A summary of the answer (1-2 sentences)\n\
         2. A detailed explanation\n\
         3. The numbers of the reference documents you used\n\
         \n\
         Answer:"
    )
}

/// One `Document i: <source>` line per result.
pub fn format_sources(results: &[SearchResult]) -> String {
    results
        .iter()
        .enumerate()
        .map(|(i, r)| match r.source() {
            Some(source) => format!("Document {}: {}", i + 1, source),
            None => format!("Document {}:", i + 1),
        })
        .collect::<Vec<_>>()
        .join("\n")
}
