pub mod animation;
pub mod event;
pub mod hit;
pub mod layout;
pub mod scroll;
pub mod transitions;

pub use animation::{AnimationState, Completion, CompletionSender};
pub use event::{GesturePhase, PanEvent, PanTracker, PointerGesture, PointerInput, PointerKind};
pub use hit::HitMap;
pub use layout::{Insets, Point, Rect, Size};
pub use scroll::{RegionId, ScrollHandle, ScrollMetrics, ScrollRegion};
pub use transitions::{Curve, Easing, Spring, TransitionConfig};
