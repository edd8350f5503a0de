use std::convert::TryFrom;
use std::time::Duration;

use super::cec::{RxCallback, TxCallback};
use super::enums::TxResult;
use super::frame::CECFrame;

#[derive(Clone, Copy, Debug, PartialEq)]
pub enum WaitError {
    /// Nothing matching arrived in time
    Timeout,
    /// The callback feeding the subscription was dropped by the driver
    Disconnected,
}

impl std::fmt::Display for WaitError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            WaitError::Timeout => write!(f, "timed out"),
            WaitError::Disconnected => write!(f, "callback was unregistered"),
        }
    }
}

impl std::error::Error for WaitError {}

/// Receiving end of a driver callback
pub struct Subscription<T> {
    receiver: tokio::sync::mpsc::UnboundedReceiver<T>,
}

impl<T> Subscription<T> {
    pub fn channel() -> (tokio::sync::mpsc::UnboundedSender<T>, Subscription<T>) {
        let (sender, receiver) = tokio::sync::mpsc::unbounded_channel();
        (sender, Subscription { receiver })
    }

    pub async fn recv_timeout(&mut self, timeout: Duration) -> Result<T, WaitError> {
        match tokio::time::timeout(timeout, self.receiver.recv()).await {
            Err(_) => Err(WaitError::Timeout),
            Ok(None) => Err(WaitError::Disconnected),
            Ok(Some(item)) => Ok(item),
        }
    }

    /// Waits for the first item matching the predicate, dropping the others, until the timeout
    /// expires
    pub async fn wait_for<F>(&mut self, timeout: Duration, predicate: F) -> Result<T, WaitError>
    where
        F: Fn(&T) -> bool,
    {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            match tokio::time::timeout_at(deadline, self.receiver.recv()).await {
                Err(_) => return Err(WaitError::Timeout),
                Ok(None) => return Err(WaitError::Disconnected),
                Ok(Some(item)) if predicate(&item) => return Ok(item),
                Ok(Some(_)) => log::debug!("Ignoring a notification while waiting"),
            }
        }
    }
}

/// Builds a receive callback posting every valid frame to the sender
pub fn rx_callback(sender: tokio::sync::mpsc::UnboundedSender<CECFrame>) -> RxCallback {
    Box::new(move |handle, data| match CECFrame::try_from(data) {
        Ok(frame) => {
            log::debug!("Session {} received {}", handle, frame);
            if sender.send(frame).is_err() {
                log::debug!("Subscription dropped, ignoring frame");
            }
        }
        Err(e) => log::warn!(
            "Session {} received an invalid frame {:02X?}: {}",
            handle,
            data,
            e
        ),
    })
}

/// Builds a transmission callback posting every result to the sender
pub fn tx_callback(sender: tokio::sync::mpsc::UnboundedSender<TxResult>) -> TxCallback {
    Box::new(move |handle, result| {
        log::debug!("Session {} asynchronous transmission: {:?}", handle, result);
        let _ = sender.send(result);
    })
}

#[cfg(test)]
mod tests {
    use test_log::test;

    use super::*;
    use crate::cec::cec::CECHandle;

    #[test(tokio::test)]
    async fn it_posts_valid_frames() {
        let (sender, mut subscription) = Subscription::channel();
        let callback = rx_callback(sender);

        callback(CECHandle(1), &[]);
        callback(CECHandle(1), &[0x40, 0x04]);

        let frame = subscription
            .recv_timeout(Duration::from_millis(100))
            .await
            .unwrap();
        assert_eq!(&[0x40u8, 0x04][..], frame.as_bytes());
        assert_eq!(
            Err(WaitError::Timeout),
            subscription.recv_timeout(Duration::from_millis(20)).await
        );
    }

    #[test(tokio::test)]
    async fn it_waits_for_matching_items() {
        let (sender, mut subscription) = Subscription::channel();
        let callback = tx_callback(sender);

        callback(CECHandle(1), TxResult::SentButNotAcked);
        callback(CECHandle(1), TxResult::SentAndAcked);

        assert_eq!(
            Ok(TxResult::SentAndAcked),
            subscription
                .wait_for(Duration::from_millis(100), |r| *r == TxResult::SentAndAcked)
                .await
        );
        assert_eq!(
            Err(WaitError::Timeout),
            subscription
                .wait_for(Duration::from_millis(50), |r| *r == TxResult::SentAndAcked)
                .await
        );
    }

    #[test(tokio::test)]
    async fn it_tells_timeouts_from_disconnections() {
        let (sender, mut subscription) = Subscription::<TxResult>::channel();

        assert_eq!(
            Err(WaitError::Timeout),
            subscription.recv_timeout(Duration::from_millis(20)).await
        );

        drop(sender);
        assert_eq!(
            Err(WaitError::Disconnected),
            subscription.recv_timeout(Duration::from_millis(20)).await
        );
    }
}
