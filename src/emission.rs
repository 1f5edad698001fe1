// emission.rs — accent toggle and sun-path blending of the three emissive materials
//
// Two independent inputs:
// - toggle mode: accent materials glow in fixed colours, or show their original emission
// - sun blend (from scroll): 0 keeps flat colours, > 0 switches to the blended
//   time-of-day texture whose mix weight is the blend factor

use crate::config::{EmissionConfig, SectionConfig};
use crate::scene::{Emission, MaterialId, Scene, SunVariant};
use glam::Vec3;

/// A bound material plus the emission it had at load time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MaterialSlot {
    pub id: MaterialId,
    pub original_emissive: Vec3,
    pub original_intensity: f32,
}

impl MaterialSlot {
    /// `None` restores the load-time emission.
    fn write(&self, scene: &mut Scene, emission: Option<Emission>) {
        match emission {
            Some(emission) => scene.set_emission(self.id, emission),
            None => scene.restore_emission(self.id, self.original_emissive, self.original_intensity),
        }
    }
}

/// The three materials the walkthrough drives. Any of them may be missing.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct AccentMaterials {
    pub accent: Option<MaterialSlot>,
    pub accent_2: Option<MaterialSlot>,
    pub white: Option<MaterialSlot>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SunBlendState {
    pub time_index: usize,
    pub blend: f32,
}

/// 0 before `start`, linear up to 1 over `span`, then flat.
pub fn sun_blend_factor(progress: f32, start: f32, span: f32) -> f32 {
    if span <= 0.0 {
        return if progress >= start { 1.0 } else { 0.0 };
    }
    ((progress - start) / span).clamp(0.0, 1.0)
}

/// Whole hour shown for a time sample: 6 AM at index 0, 15 hours over 39 steps.
pub fn time_of_day_hour(index: usize) -> u32 {
    (6.0 + index as f32 * (15.0 / 39.0)).round() as u32
}

pub fn time_of_day_label(index: usize) -> String {
    let (hour, suffix) = match time_of_day_hour(index) % 24 {
        0 => (12, "AM"),
        h if h < 12 => (h, "AM"),
        12 => (12, "PM"),
        h => (h - 12, "PM"),
    };
    format!("Sun path - {hour}{suffix}")
}

#[derive(Debug)]
pub struct EmissionController {
    accent_color: Vec3,
    accent_2_color: Vec3,
    neutral_color: Vec3,
    time_samples: usize,
    time_index: usize,
    blend: f32,
    applied: Option<(bool, bool)>,
}

impl EmissionController {
    pub fn new(config: &EmissionConfig) -> Self {
        let time_samples = config.time_samples.max(1);
        Self {
            accent_color: Vec3::from(config.accent_color),
            accent_2_color: Vec3::from(config.accent_2_color),
            neutral_color: Vec3::from(config.neutral_color),
            time_samples,
            time_index: config.initial_time_index.min(time_samples - 1),
            blend: 0.0,
            applied: None,
        }
    }

    pub fn time_index(&self) -> usize {
        self.time_index
    }

    pub fn time_samples(&self) -> usize {
        self.time_samples
    }

    pub fn blend(&self) -> f32 {
        self.blend
    }

    pub fn sun_state(&self) -> SunBlendState {
        SunBlendState {
            time_index: self.time_index,
            blend: self.blend,
        }
    }

    /// Selects the time-of-day image. Out-of-range indices are ignored.
    pub fn select_time_index(&mut self, index: usize) -> bool {
        if index >= self.time_samples {
            log::debug!("Ignoring time index {index} (have {})", self.time_samples);
            return false;
        }
        self.time_index = index;
        true
    }

    /// Base colour a blended texture variant mixes with the sun image.
    pub fn base_color(&self, variant: SunVariant) -> Vec3 {
        match variant {
            SunVariant::Neutral => self.neutral_color,
            SunVariant::Accent => self.accent_color,
            SunVariant::Accent2 => self.accent_2_color,
        }
    }

    pub fn invalidate(&mut self) {
        self.applied = None;
    }

    /// Recomputes the blend factor and rewrites materials when the look changes.
    pub fn update(
        &mut self,
        scene: &mut Scene,
        materials: &AccentMaterials,
        toggle_mode: bool,
        progress: f32,
        sections: &SectionConfig,
    ) {
        self.blend = sun_blend_factor(progress, sections.sun_start, sections.sun_span);
        let key = (toggle_mode, self.blend > 0.0);
        if self.applied == Some(key) {
            return;
        }
        let (_, blended) = key;

        if let Some(slot) = materials.accent {
            let emission = if blended {
                Some(Emission::Sun(if toggle_mode { SunVariant::Accent } else { SunVariant::Neutral }))
            } else if toggle_mode {
                Some(Emission::Flat(self.accent_color))
            } else {
                None
            };
            slot.write(scene, emission);
        }
        if let Some(slot) = materials.accent_2 {
            let emission = if blended {
                Some(Emission::Sun(if toggle_mode { SunVariant::Accent2 } else { SunVariant::Neutral }))
            } else if toggle_mode {
                Some(Emission::Flat(self.accent_2_color))
            } else {
                None
            };
            slot.write(scene, emission);
        }
        if let Some(slot) = materials.white {
            let emission = blended.then_some(Emission::Sun(SunVariant::Neutral));
            slot.write(scene, emission);
        }

        self.applied = Some(key);
    }
}
