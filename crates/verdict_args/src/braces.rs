/// Returns the longest well-nested `{...}` span in `payload`, found by brace
/// counting from the first opening brace. A payload whose braces never
/// re-balance (a truncated stream) yields the open tail instead, so callers
/// can still attempt salvage on it.
pub fn balanced_object(payload: &str) -> Option<&str> {
    let start = payload.find('{')?;
    let mut depth = 0usize;
    for (offset, byte) in payload[start..].bytes().enumerate() {
        match byte {
            b'{' => depth += 1,
            b'}' => {
                depth -= 1;
                if depth == 0 {
                    return Some(&payload[start..start + offset + 1]);
                }
            }
            _ => {}
        }
    }
    Some(&payload[start..])
}
