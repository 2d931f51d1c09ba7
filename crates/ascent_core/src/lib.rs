pub mod camera;
pub mod config;
pub mod content;
pub mod dialog;
pub mod director;
pub mod error;
pub mod handlers;
pub mod input;
pub mod loading;
pub mod motion;
pub mod music;
pub mod navigation;
pub mod presentation;
pub mod tier;
pub mod time;
pub mod tween;

pub use camera::{CameraRig, Ray};
pub use config::{load_config_from_path, ExperienceConfig};
pub use content::{load_journey_from_path, Journey};
pub use dialog::DialogSystem;
pub use director::{FrameReport, Navigator};
pub use error::ContentError;
pub use handlers::{handle_resize, Resizable, ScenePicker};
pub use input::{InputEvent, InputQueue, Key};
pub use loading::{BarrierSignal, LoadingBarrier};
pub use motion::{Band, MotionModel};
pub use music::{MusicCommand, MusicState};
pub use navigation::{FocusMode, NavigationState};
pub use presentation::{PresentationIntent, PresentationState};
pub use tier::{DeviceTier, PipelinePlan, PostStage};
pub use time::FrameClock;
pub use tween::Tweener;
