//! Plain-text rendering of a query result for tool output

use crate::wolfram_client::QueryResult;

pub fn format_result_as_text(result: &QueryResult) -> String {
    if !result.success {
        if result.error {
            return "Error: Wolfram Alpha could not process this query".to_string();
        }
        return "No results found".to_string();
    }

    let mut output = format!("Wolfram Alpha Result ({} sections):\n\n", result.numpods);

    for pod in &result.pods {
        output.push_str(&format!("=== {} ===\n", pod.title));

        for subpod in &pod.subpods {
            if !subpod.plaintext.is_empty() {
                output.push_str(&subpod.plaintext);
                output.push('\n');
            }
            if !subpod.image.src.is_empty() {
                output.push_str(&format!("[Image: {}]\n", subpod.image.src));
            }
        }
        output.push('\n');
    }

    output
}
