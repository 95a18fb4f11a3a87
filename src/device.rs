//! Viewport width to device class.
//!
//! Two independent predicates come out of the width: the coarse `mobile`
//! gate (`< 768`) that particle counts and frame throttling branch on, and
//! the four-step scale factor that sizes every new star. They overlap but
//! do not line up; a 900px viewport is not mobile yet scales by 0.9.

const SMALL_MOBILE_MAX: f32 = 480.0;
const MOBILE_MAX: f32 = 768.0;
const DESKTOP_LITE_MAX: f32 = 1024.0;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeviceTier {
    SmallMobile,
    Mobile,
    Desktop,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DeviceProfile {
    width: f32,
    scale_factor: f32,
}

impl DeviceProfile {
    pub fn from_width(width: f32) -> Self {
        let scale_factor = if width < SMALL_MOBILE_MAX {
            0.6
        } else if width < MOBILE_MAX {
            0.75
        } else if width < DESKTOP_LITE_MAX {
            0.9
        } else {
            1.0
        };
        Self { width, scale_factor }
    }

    pub fn width(&self) -> f32 {
        self.width
    }

    pub fn scale_factor(&self) -> f32 {
        self.scale_factor
    }

    pub fn is_small_mobile(&self) -> bool {
        self.width < SMALL_MOBILE_MAX
    }

    pub fn is_mobile(&self) -> bool {
        self.width < MOBILE_MAX
    }

    pub fn tier(&self) -> DeviceTier {
        if self.is_small_mobile() {
            DeviceTier::SmallMobile
        } else if self.is_mobile() {
            DeviceTier::Mobile
        } else {
            DeviceTier::Desktop
        }
    }
}
