use ratatui::style::Color;

use crate::model::task::{Severity, Status};

pub fn status_color(status: Status) -> Color {
    match status {
        Status::ToDo => Color::Rgb(0x8D, 0x9B, 0xAE),
        Status::InProgress => Color::Rgb(0x4F, 0xC3, 0xF7),
        Status::BugReport => Color::Rgb(0xEF, 0x53, 0x50),
        Status::Testing => Color::Rgb(0xFF, 0xB7, 0x4D),
        Status::Complete => Color::Rgb(0x81, 0xC7, 0x84),
    }
}

pub fn severity_color(severity: Severity) -> Color {
    match severity {
        Severity::High => Color::Red,
        Severity::Medium => Color::Yellow,
        Severity::Low => Color::Cyan,
        Severity::Other => Color::Gray,
    }
}
