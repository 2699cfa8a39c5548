//! Live marine gauge state: clock synchronization, bounded sample history,
//! axis scaling, projection into viewport space and routing of pushed
//! property updates to gauges.

pub mod axis;
pub mod buffer;
pub mod clock;
pub mod dispatcher;
pub mod gauge;
pub mod message;
pub mod projection;
pub mod render;

pub use axis::{AxisScaler, AxisState, PinnedBounds, TimeStep};
pub use buffer::{Sample, SampleBuffer};
pub use clock::{ClockSync, ManualClock, Moment, SystemClock, WallClock};
pub use dispatcher::{Dispatcher, GaugeFrame};
pub use gauge::{Gauge, GaugeBehavior, GaugeKind, GaugeStatus};
pub use message::{GaugeMeta, MessageError, PropertyUpdate, PropertyValue, PushMessage};
pub use projection::{Point, Projection, Viewport};
pub use render::DrawCommand;
