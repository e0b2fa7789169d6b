use super::protocol::Response;

/// Serialize a response for stdout, one line unless `pretty`.
pub fn render(response: &Response, pretty: bool) -> String {
    let rendered = if pretty {
        serde_json::to_string_pretty(response)
    } else {
        serde_json::to_string(response)
    };
    rendered.unwrap_or_else(|e| {
        format!(r#"{{"error":{{"code":"output_error","message":"{e}"}}}}"#)
    })
}
