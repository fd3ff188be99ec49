pub mod cookie;
pub mod html;
