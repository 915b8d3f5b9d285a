use std::collections::VecDeque;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Host collaborator for canvas resources.
pub trait FeatureProvider {
    /// Resolves an image path to the source the host will draw.
    fn load_image(&self, path: &str) -> Result<String, String> {
        let _ = path;
        Err("Loading images is not allowed.".to_string())
    }

    /// Resolves a font identifier to a font family name.
    fn load_font(&self, identifier: &str) -> Result<String, String> {
        let _ = identifier;
        Err("Loading fonts is not allowed.".to_string())
    }

    /// Drawing shown while a canvas is waiting for its steps to resolve.
    fn draw_loading_canvas(&self, width: u32, height: u32) -> Vec<DrawCommand> {
        let _ = (width, height);
        Vec::new()
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DefaultFeatureProvider;

impl FeatureProvider for DefaultFeatureProvider {}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum DrawCommand {
    Clear,
    PutImage {
        source: String,
        x: f64,
        y: f64,
        size: Option<(f64, f64)>,
    },
    PutImagePart {
        source: String,
        source_rect: (f64, f64, f64, f64),
        dest_x: f64,
        dest_y: f64,
        dest_size: Option<(f64, f64)>,
    },
    SetFont {
        size: f64,
        font: String,
    },
    SetFillStyle {
        color: String,
    },
    FillText {
        text: String,
        x: f64,
        y: f64,
        h_align: String,
        v_align: String,
    },
    FillRect {
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    },
    SetStrokeStyle {
        color: String,
    },
    SetLineWidth {
        width: f64,
    },
    StrokeText {
        text: String,
        x: f64,
        y: f64,
        h_align: String,
        v_align: String,
    },
}

/// Frozen view of a canvas at the moment it was output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CanvasSnapshot {
    pub id: String,
    pub width: u32,
    pub height: u32,
    pub loading: Vec<DrawCommand>,
    pub commands: Vec<DrawCommand>,
}

/// Drawing steps queue up in order and only resolve when the canvas is output.
#[derive(Debug, Clone)]
pub struct ChainedCanvas {
    width: u32,
    height: u32,
    pending: VecDeque<DrawCommand>,
    resolved: Vec<DrawCommand>,
}

impl ChainedCanvas {
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width,
            height,
            pending: VecDeque::new(),
            resolved: Vec::new(),
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn update(&mut self, command: DrawCommand) {
        self.pending.push_back(command);
    }

    /// Resolves every queued step through `provider`. Steps whose resources
    /// fail to load are dropped with a warning.
    pub fn resolve(&mut self, id: &str, provider: &dyn FeatureProvider) -> CanvasSnapshot {
        while let Some(command) = self.pending.pop_front() {
            if let Some(command) = resolve_command(command, provider) {
                if command == DrawCommand::Clear {
                    self.resolved.clear();
                } else {
                    self.resolved.push(command);
                }
            }
        }
        CanvasSnapshot {
            id: id.to_string(),
            width: self.width,
            height: self.height,
            loading: provider.draw_loading_canvas(self.width, self.height),
            commands: self.resolved.clone(),
        }
    }
}

fn resolve_command(command: DrawCommand, provider: &dyn FeatureProvider) -> Option<DrawCommand> {
    match command {
        DrawCommand::PutImage { source, x, y, size } => match provider.load_image(&source) {
            Ok(source) => Some(DrawCommand::PutImage { source, x, y, size }),
            Err(reason) => {
                warn!(path = %source, %reason, "WTCD failed to load image");
                None
            }
        },
        DrawCommand::PutImagePart {
            source,
            source_rect,
            dest_x,
            dest_y,
            dest_size,
        } => match provider.load_image(&source) {
            Ok(source) => Some(DrawCommand::PutImagePart {
                source,
                source_rect,
                dest_x,
                dest_y,
                dest_size,
            }),
            Err(reason) => {
                warn!(path = %source, %reason, "WTCD failed to load image");
                None
            }
        },
        DrawCommand::SetFont { size, font } => match provider.load_font(&font) {
            Ok(font) => Some(DrawCommand::SetFont { size, font }),
            Err(reason) => {
                warn!(identifier = %font, %reason, "WTCD failed to load font");
                None
            }
        },
        other => Some(other),
    }
}
