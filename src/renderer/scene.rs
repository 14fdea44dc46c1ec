//! Frame contents in canvas pixels
//!
//! Entities are drawn as solid quads: sky, then hazards in spawn order,
//! then the player on top.

use super::shapes::{filled_rect, vertical_gradient};
use super::vertex::{Vertex, colors};
use crate::consts::{CANVAS_HEIGHT, CANVAS_WIDTH};
use crate::sim::{Hazard, HazardSize, Player, Rect};

pub fn hazard_color(size: HazardSize) -> [f32; 4] {
    match size {
        HazardSize::Small => colors::HAZARD_SMALL,
        HazardSize::Medium => colors::HAZARD_MEDIUM,
        HazardSize::Large => colors::HAZARD_LARGE,
    }
}

/// Build the vertex list for one frame
pub fn build_scene(player: &Player, hazards: &[Hazard]) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity((hazards.len() + 2) * 6);

    let sky = Rect::new(0.0, 0.0, CANVAS_WIDTH, CANVAS_HEIGHT);
    vertices.extend(vertical_gradient(&sky, colors::SKY_TOP, colors::SKY_BOTTOM));

    for hazard in hazards {
        vertices.extend(filled_rect(&hazard.rect, hazard_color(hazard.size)));
    }

    vertices.extend(filled_rect(&player.rect, colors::PLAYER));
    vertices
}
