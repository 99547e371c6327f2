//! Submit gating and error display for forms
//!
//! While a submission is in flight the form's submit control is disabled;
//! it is re-enabled when the submission settles either way. A failure's
//! message is kept verbatim for display next to the form and cleared by
//! the next success.

use crate::error::{ClientError, Result};
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, PoisonError};

#[derive(Debug, Default)]
pub struct FormState {
    in_flight: AtomicBool,
    error: Mutex<Option<String>>,
}

/// Held for the duration of one submission
#[derive(Debug)]
pub struct SubmitGuard<'a> {
    form: &'a FormState,
}

impl Drop for SubmitGuard<'_> {
    fn drop(&mut self) {
        self.form.in_flight.store(false, Ordering::SeqCst);
    }
}

impl FormState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Claim the form; `None` while another submission is in flight
    pub fn begin(&self) -> Option<SubmitGuard<'_>> {
        self.in_flight
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .ok()
            .map(|_| SubmitGuard { form: self })
    }

    /// Whether the submit control is currently disabled
    pub fn is_submitting(&self) -> bool {
        self.in_flight.load(Ordering::SeqCst)
    }

    /// Message to display next to the form
    pub fn error(&self) -> Option<String> {
        self.error
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn set_error(&self, message: Option<String>) {
        *self.error.lock().unwrap_or_else(PoisonError::into_inner) = message;
    }

    /// Run one submission under the in-flight guard
    pub async fn run<T, Fut>(&self, submission: Fut) -> Result<T>
    where
        Fut: Future<Output = Result<T>>,
    {
        let _guard = self.begin().ok_or(ClientError::SubmitInFlight)?;

        let result = submission.await;
        match &result {
            Ok(_) => self.set_error(None),
            Err(err) => self.set_error(Some(err.to_string())),
        }
        result
    }
}
