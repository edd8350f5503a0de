use std::time::Duration;

use harness::{Scenario, ScenarioError};

use super::checks::{self, expect_ok};
use super::ConformanceContext;
use crate::cec::{CECFrame, CECLogicalAddress, CECOpcode, WaitError};

/// How long a repeated Image View On is looked for after the first one
const REPEAT_WINDOW: Duration = Duration::from_millis(500);

pub fn get_scenarios() -> Vec<Box<dyn Scenario<ConformanceContext>>> {
    vec![Box::new(ReceiveImageViewOn {})]
}

fn is_image_view_on(frame: &CECFrame) -> bool {
    frame.has_opcode(CECOpcode::ImageViewOn) && frame.destination() == CECLogicalAddress::TV.raw()
}

/// A source device on the bus wakes the TV up: exactly one Image View On gets to the receive
/// callback
pub struct ReceiveImageViewOn {}

#[async_trait::async_trait]
impl Scenario<ConformanceContext> for ReceiveImageViewOn {
    fn get_name(&self) -> &str {
        "receive_image_view_on"
    }

    async fn run(&self, context: &ConformanceContext) -> Result<(), ScenarioError> {
        let session = checks::open(context)?;
        expect_ok(
            "add logical address",
            session.add_logical_address(CECLogicalAddress::TV.raw()),
        )?;
        let mut frames = expect_ok("register receive callback", session.subscribe_rx())?;

        log::info!(
            "Waiting {:?} for an Image View On to the TV",
            context.receive_timeout
        );
        let frame = frames
            .wait_for(context.receive_timeout, is_image_view_on)
            .await
            .map_err(|e| match e {
                WaitError::Timeout => ScenarioError::Recoverable(format!(
                    "no Image View On received within {:?}",
                    context.receive_timeout
                )),
                WaitError::Disconnected => ScenarioError::Recoverable(String::from(
                    "the driver dropped the receive callback before any Image View On",
                )),
            })?;
        log::info!("Received {} from {:X}", frame, frame.initiator());

        match frames.wait_for(REPEAT_WINDOW, is_image_view_on).await {
            Ok(repeated) => {
                return Err(ScenarioError::Recoverable(format!(
                    "received a second Image View On {}, expected exactly one",
                    repeated
                )))
            }
            Err(_) => log::debug!("No other Image View On within {:?}", REPEAT_WINDOW),
        }

        expect_ok("clear callbacks", session.unsubscribe())?;
        checks::close(session)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use test_log::test;

    use super::*;
    use crate::cec::EmulatedCECDriver;
    use crate::configuration::SuiteConfiguration;

    fn context(driver: EmulatedCECDriver) -> ConformanceContext {
        let mut configuration = SuiteConfiguration::default();
        configuration.suite.receive_timeout_secs = 1;
        ConformanceContext::new(Arc::new(Mutex::new(driver)), &configuration)
    }

    #[test(tokio::test)]
    async fn it_receives_one_image_view_on() {
        let driver = EmulatedCECDriver::builder()
            .with_injected_frame(Duration::from_millis(10), vec![0x4F, 0x36])
            .with_injected_frame(Duration::from_millis(50), vec![0x40, 0x04])
            .build();

        assert_eq!(Ok(()), ReceiveImageViewOn {}.run(&context(driver)).await);
    }

    #[test(tokio::test)]
    async fn it_fails_without_image_view_on() {
        let driver = EmulatedCECDriver::builder().build();

        let result = ReceiveImageViewOn {}.run(&context(driver)).await;
        match result {
            Err(ScenarioError::Recoverable(msg)) => {
                assert!(msg.starts_with("no Image View On"), "{}", msg)
            }
            other => panic!("Unexpected result {:?}", other),
        }
    }

    #[test(tokio::test)]
    async fn it_fails_on_repeated_image_view_on() {
        let driver = EmulatedCECDriver::builder()
            .with_injected_frame(Duration::from_millis(20), vec![0x40, 0x04])
            .with_injected_frame(Duration::from_millis(60), vec![0x80, 0x04])
            .build();
        let context = context(driver);

        let result = ReceiveImageViewOn {}.run(&context).await;
        match result {
            Err(ScenarioError::Recoverable(msg)) => {
                assert!(msg.contains("expected exactly one"), "{}", msg)
            }
            other => panic!("Unexpected result {:?}", other),
        }
    }
}
