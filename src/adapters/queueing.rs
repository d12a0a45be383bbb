use crate::adapters::ResponseAdapter;
use crate::cookies::CookieDirective;
use crate::errors::UtmError;
use crate::host::CookieQueueing;
use time::OffsetDateTime;

/// Response adapter for cookie queues: every operation becomes a queued directive.
pub struct QueueingAdapter<'a, Q> {
    queue: &'a mut Q,
}

impl<'a, Q> QueueingAdapter<'a, Q> {
    pub fn new(queue: &'a mut Q) -> Self {
        Self { queue }
    }
}

impl<Q: CookieQueueing> ResponseAdapter for QueueingAdapter<'_, Q> {
    fn set_cookie(&mut self, name: &str, value: &str, expires: OffsetDateTime) -> Result<(), UtmError> {
        self.queue.queue(CookieDirective::Set {
            name: name.to_string(),
            value: value.to_string(),
            expires,
        });
        Ok(())
    }

    fn delete_cookie(&mut self, name: &str) -> Result<(), UtmError> {
        self.queue.queue(CookieDirective::Forget {
            name: name.to_string(),
        });
        Ok(())
    }
}
