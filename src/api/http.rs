use reqwest::blocking::Client;
use std::{io::Read, thread::sleep, time::Duration};

use crate::error::{MgdlError, MgdlResult};

const INITIAL_DELAY: u64 = 300;
const USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"));

/// The HTTP capabilities the downloader needs from its transport.
pub trait Fetch {
    /// Fetch a whole response body. `query` is appended in order.
    fn get(&self, url: &str, query: &[(&str, &str)]) -> MgdlResult<Vec<u8>>;

    /// Open a response body for streaming, once the status is known good.
    fn open(&self, url: &str) -> MgdlResult<Box<dyn Read>>;
}

impl<T: Fetch + ?Sized> Fetch for &T {
    fn get(&self, url: &str, query: &[(&str, &str)]) -> MgdlResult<Vec<u8>> {
        (**self).get(url, query)
    }

    fn open(&self, url: &str) -> MgdlResult<Box<dyn Read>> {
        (**self).open(url)
    }
}

pub struct HttpClient {
    client: Client,
    max_attempts: usize,
}

impl HttpClient {
    pub fn new(timeout: Duration, max_attempts: usize) -> MgdlResult<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()?;

        Ok(Self {
            client,
            max_attempts: max_attempts.max(1),
        })
    }
}

impl Fetch for HttpClient {
    fn get(&self, url: &str, query: &[(&str, &str)]) -> MgdlResult<Vec<u8>> {
        retry(
            || {
                let response = self.client.get(url).query(query).send()?.error_for_status()?;
                Ok(response.bytes()?.to_vec())
            },
            self.max_attempts,
            INITIAL_DELAY,
        )
    }

    fn open(&self, url: &str) -> MgdlResult<Box<dyn Read>> {
        retry(
            || {
                let response = self.client.get(url).send()?.error_for_status()?;
                Ok(Box::new(response) as Box<dyn Read>)
            },
            self.max_attempts,
            INITIAL_DELAY,
        )
    }
}

fn retry<F, T>(mut operation: F, max_attempts: usize, initial_delay: u64) -> MgdlResult<T>
where
    F: FnMut() -> MgdlResult<T>,
{
    let mut delay = initial_delay;

    for attempt in 0..max_attempts {
        match operation() {
            Ok(result) => return Ok(result),
            Err(_) if attempt + 1 < max_attempts => {
                sleep(Duration::from_millis(delay));
                delay *= 2;
            }
            Err(e) => return Err(e),
        }
    }

    Err(MgdlError::Remote("Max retry attempts exhausted".into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn retry_stops_on_first_success() {
        let calls = Cell::new(0);
        let result = retry(
            || {
                calls.set(calls.get() + 1);
                if calls.get() < 2 {
                    Err(MgdlError::Remote("flaky".into()))
                } else {
                    Ok(calls.get())
                }
            },
            3,
            0,
        );
        assert_eq!(result.unwrap(), 2);
    }

    #[test]
    fn retry_single_attempt_propagates() {
        let calls = Cell::new(0);
        let result: MgdlResult<()> = retry(
            || {
                calls.set(calls.get() + 1);
                Err(MgdlError::Remote("down".into()))
            },
            1,
            0,
        );
        assert!(matches!(result, Err(MgdlError::Remote(_))));
        assert_eq!(calls.get(), 1);
    }
}
