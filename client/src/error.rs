use parallax_capture::CaptureError;
use parallax_channel::ChannelError;
use parallax_types::FailureKind;
use thiserror::Error;

/// Everything that can stop a session from the client side.
///
/// The user never sees these directly; [`ClientError::failure_kind`] maps
/// each one onto the user-facing taxonomy before it is rendered.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("capture error: {0}")]
    Capture(#[from] CaptureError),

    #[error("channel error: {0}")]
    Channel(#[from] ChannelError),

    #[error("config error: {0}")]
    Config(String),
}

impl ClientError {
    /// Map an internal failure onto the user-facing taxonomy.
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            Self::Capture(CaptureError::Camera(_)) => FailureKind::CaptureUnavailable,
            Self::Capture(CaptureError::Sensor(_)) => FailureKind::SensorUnavailable,
            Self::Channel(_) => FailureKind::ChannelUnavailable,
            Self::Config(_) => FailureKind::DeviceIncompatible,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parallax_capture::SourceError;

    #[test]
    fn each_error_maps_onto_the_user_facing_taxonomy() {
        let camera = ClientError::from(CaptureError::Camera(SourceError::Ended));
        assert_eq!(camera.failure_kind(), FailureKind::CaptureUnavailable);

        let sensor = ClientError::from(CaptureError::Sensor(SourceError::Ended));
        assert_eq!(sensor.failure_kind(), FailureKind::SensorUnavailable);

        let channel = ClientError::from(ChannelError::Closed);
        assert_eq!(channel.failure_kind(), FailureKind::ChannelUnavailable);

        let config = ClientError::Config("bad origin".into());
        assert_eq!(config.failure_kind(), FailureKind::DeviceIncompatible);
    }
}
