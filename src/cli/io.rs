//! Output handling for the CLI
//!
//! JSON responses are a single object per line on stdout; markup is
//! written as is. UTF-8 only.

use std::io::{self, Write};

use serde_json::{json, Value};

use super::errors::CliResult;

/// Success envelope
pub fn response(data: Value) -> Value {
    json!({
        "status": "ok",
        "data": data
    })
}

/// Error envelope
pub fn error_response(code: &str, message: &str) -> Value {
    json!({
        "status": "error",
        "code": code,
        "message": message
    })
}

fn write_value(value: &Value) -> CliResult<()> {
    let mut stdout = io::stdout();
    serde_json::to_writer(&mut stdout, value)?;
    writeln!(stdout)?;
    stdout.flush()?;
    Ok(())
}

/// Write a success response to stdout
pub fn write_response(data: Value) -> CliResult<()> {
    write_value(&response(data))
}

/// Write an error response to stdout
pub fn write_error(code: &str, message: &str) -> CliResult<()> {
    write_value(&error_response(code, message))
}

/// Write text to stdout, newline-terminated
pub fn write_text(text: &str) -> CliResult<()> {
    let mut stdout = io::stdout();
    stdout.write_all(text.as_bytes())?;
    if !text.ends_with('\n') {
        writeln!(stdout)?;
    }
    stdout.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelopes() {
        assert_eq!(response(json!([1])), json!({"status": "ok", "data": [1]}));
        let err = error_response("Q_NOT_FOUND", "Column 'x' not found");
        assert_eq!(err["status"], "error");
        assert_eq!(err["code"], "Q_NOT_FOUND");
    }
}
