use verdict_domain::{
    RawTurn, SessionStore, StructuredResponse, TransportKind, TurnRecord,
};

/// Placed in `final_output` when a streamed turn yields no usable text at
/// all. A signaled data-quality condition, not a crash.
pub const NO_RESPONSE_SENTINEL: &str = "Error: No response captured from agent";

const PUNCTUATION_TOKENS: [&str; 7] = [".", ",", ":", ";", "!", "?", "%"];
const CURRENCY_TOKENS: [&str; 4] = ["$", "€", "£", "¥"];

/// Reduces one raw turn to a canonical record and appends it to the active
/// session, opening a session first if none is active for this test case.
/// Returns the turn's index within its session.
pub fn ingest(store: &mut SessionStore, input: impl ToString, raw: RawTurn) -> usize {
    if store.active().is_none() {
        store.begin();
    }
    let record = match raw {
        RawTurn::Streamed(lines) => normalize_streamed(input, lines),
        RawTurn::Structured(response) => normalize_structured(input, response),
    };
    tracing::debug!(transport = %record.transport, "normalized turn");
    // A session is guaranteed active at this point.
    store.push_turn(record).unwrap_or_default()
}

/// Streamed transport: classify every log line, stitch the inference
/// fragments back into the final answer, keep all lines as raw fragments.
pub fn normalize_streamed(input: impl ToString, lines: Vec<String>) -> TurnRecord {
    let mut inference_tokens: Vec<String> = Vec::new();
    let mut collecting = false;

    for line in &lines {
        if line.contains("tool_execution>") {
            // Execution marker; never part of the answer text.
        } else if line.contains("call_id=") && line.contains("tool_name=") {
            // New-format tool call, possibly incomplete. The extractor reads
            // it from the raw fragments; the answer text must not.
        } else if let Some(index) = line.find("inference>") {
            collecting = true;
            let content = line[index + "inference>".len()..].trim();
            if !content.is_empty()
                && !(content.contains("call_id=") && content.contains("tool_name="))
            {
                inference_tokens.push(content.to_string());
            }
        } else if collecting && !line.trim().is_empty() {
            if line.contains("step_complete>") || line.contains("call_id=") {
                collecting = false;
            } else {
                inference_tokens.push(line.trim().to_string());
            }
        }
    }

    let final_output = if !inference_tokens.is_empty() {
        stitch(&inference_tokens)
    } else {
        last_plain_line(&lines).unwrap_or_else(|| {
            tracing::warn!("no response content captured from streaming turn");
            NO_RESPONSE_SENTINEL.to_string()
        })
    };

    TurnRecord::new(input, TransportKind::Streaming)
        .final_output(final_output)
        .raw_fragments(lines)
}

/// Structured transport: the answer is the output message verbatim and the
/// typed steps are retained for the extractor.
pub fn normalize_structured(input: impl ToString, response: StructuredResponse) -> TurnRecord {
    TurnRecord::new(input, TransportKind::Structured)
        .final_output(response.output_message.content)
        .structured_steps(response.steps)
}

fn last_plain_line(lines: &[String]) -> Option<String> {
    lines
        .iter()
        .rev()
        .find(|line| {
            !line.trim().is_empty()
                && !line.contains("tool_execution>")
                && !line.contains("inference>")
        })
        .map(|line| line.trim().to_string())
}

/// Re-joins streamed tokens into readable text. Spacing is suppressed before
/// punctuation, after currency symbols, and inside split-up numbers.
fn stitch(tokens: &[String]) -> String {
    let mut output = String::new();
    for (index, token) in tokens.iter().enumerate() {
        if index == 0 {
            output.push_str(token);
            continue;
        }
        let prev = tokens[index - 1].as_str();
        let next_is_digits = tokens
            .get(index + 1)
            .map(|t| is_digits(t))
            .unwrap_or(false);

        let joined = PUNCTUATION_TOKENS.contains(&token.as_str())
            || CURRENCY_TOKENS.contains(&prev)
            || (is_digits(prev) && (token == "." || token == ",") && next_is_digits)
            || (is_digits(prev) && is_digits(token))
            || (prev == "." && is_digits(token));

        if !joined {
            output.push(' ');
        }
        output.push_str(token);
    }
    output
}

fn is_digits(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit())
}
