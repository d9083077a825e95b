// Parameter job ingestion
//
// A job is a count followed by that many floating-point values, separated by
// any whitespace including newlines. A count of zero, or end of input before a
// count, means there are no more jobs.

use std::collections::VecDeque;
use std::io::BufRead;

// Upper bound on the up-front allocation for a job; the count itself comes from stdin
const MAX_PREALLOCATED: usize = 4096;

pub struct ParameterReader<R> {
    input: R,
    pending: VecDeque<String>,
}

impl<R: BufRead> ParameterReader<R> {
    pub fn new(input: R) -> Self {
        ParameterReader {
            input,
            pending: VecDeque::new(),
        }
    }

    fn next_token(&mut self) -> Result<Option<String>, String> {
        while self.pending.is_empty() {
            let mut line = String::new();
            let read = self
                .input
                .read_line(&mut line)
                .map_err(|e| format!("Failed to read parameters: {}", e))?;
            if read == 0 {
                return Ok(None);
            }
            self.pending
                .extend(line.split_whitespace().map(str::to_string));
        }
        Ok(self.pending.pop_front())
    }

    /// Reads the next job, or `None` when input is exhausted
    pub fn next_job(&mut self) -> Result<Option<Vec<f64>>, String> {
        let count = match self.next_token()? {
            Some(token) => token
                .parse::<usize>()
                .map_err(|e| format!("Invalid parameter count '{}': {}", token, e))?,
            None => return Ok(None),
        };

        if count == 0 {
            return Ok(None);
        }

        let mut values = Vec::with_capacity(count.min(MAX_PREALLOCATED));
        while values.len() < count {
            let token = self.next_token()?.ok_or_else(|| {
                format!(
                    "Expected {} parameters, input ended after {}",
                    count,
                    values.len()
                )
            })?;
            let value = token
                .parse::<f64>()
                .map_err(|e| format!("Invalid parameter '{}' at index {}: {}", token, values.len(), e))?;
            values.push(value);
        }

        Ok(Some(values))
    }
}

/// Formats parameters as a job line the reader accepts
pub fn format_job(values: &[f64]) -> String {
    let mut line = values.len().to_string();
    for value in values {
        line.push(' ');
        line.push_str(&value.to_string());
    }
    line
}
