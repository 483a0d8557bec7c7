pub mod canvas;
pub mod skeleton;
pub mod text;
pub mod window;

pub use canvas::Canvas;
pub use window::GameWindow;

pub type Color = [u8; 4];

pub const HAND_COLOR: Color = [27, 36, 122, 255];
pub const FOOT_COLOR: Color = [235, 255, 15, 255];
pub const JOINT_COLOR: Color = [248, 113, 113, 255];
pub const BONE_COLOR: Color = [56, 189, 248, 255];
pub const TARGET_IDLE_COLOR: Color = [239, 68, 68, 255];
pub const TARGET_CONTACT_COLOR: Color = [34, 197, 94, 255];
pub const SCORE_COLOR: Color = [59, 130, 246, 255];
pub const MENU_IDLE_COLOR: Color = [251, 113, 133, 255];
pub const MENU_ACTIVE_COLOR: Color = [74, 222, 128, 255];
pub const COUNTDOWN_COLOR: Color = [250, 204, 21, 255];
