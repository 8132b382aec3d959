//! Easing curves for tweened keyframes.
//!
//! Every curve maps `t` in `[0, 1]` to an eased progress with `ease(0) == 0`
//! and `ease(1) == 1`. Back and elastic curves overshoot in between.

use std::f64::consts::PI;

use frapack_model::TweenType;

/// Interpolate from `a` to `b` at `t` along an easing curve.
pub fn interpolate(a: f64, b: f64, t: f64, tween: TweenType) -> f64 {
    a + (b - a) * ease(tween, t)
}

/// Evaluate an easing curve.
pub fn ease(tween: TweenType, t: f64) -> f64 {
    use TweenType::*;

    match tween {
        Linear => t,

        EaseInQuad => t * t,
        EaseOutQuad => 1.0 - (1.0 - t).powi(2),
        EaseInOutQuad => in_out_power(t, 2),

        EaseInCubic => t.powi(3),
        EaseOutCubic => 1.0 - (1.0 - t).powi(3),
        EaseInOutCubic => in_out_power(t, 3),

        EaseInQuart => t.powi(4),
        EaseOutQuart => 1.0 - (1.0 - t).powi(4),
        EaseInOutQuart => in_out_power(t, 4),

        EaseInQuint => t.powi(5),
        EaseOutQuint => 1.0 - (1.0 - t).powi(5),
        EaseInOutQuint => in_out_power(t, 5),

        EaseInSine => 1.0 - (t * PI / 2.0).cos(),
        EaseOutSine => (t * PI / 2.0).sin(),
        EaseInOutSine => -((PI * t).cos() - 1.0) / 2.0,

        EaseInExpo => {
            if t == 0.0 {
                0.0
            } else {
                2f64.powf(10.0 * t - 10.0)
            }
        }
        EaseOutExpo => {
            if t == 1.0 {
                1.0
            } else {
                1.0 - 2f64.powf(-10.0 * t)
            }
        }
        EaseInOutExpo => {
            if t == 0.0 {
                0.0
            } else if t == 1.0 {
                1.0
            } else if t < 0.5 {
                2f64.powf(20.0 * t - 10.0) / 2.0
            } else {
                (2.0 - 2f64.powf(-20.0 * t + 10.0)) / 2.0
            }
        }

        EaseInCirc => 1.0 - (1.0 - t * t).max(0.0).sqrt(),
        EaseOutCirc => (1.0 - (t - 1.0).powi(2)).max(0.0).sqrt(),
        EaseInOutCirc => {
            if t < 0.5 {
                (1.0 - (1.0 - (2.0 * t).powi(2)).max(0.0).sqrt()) / 2.0
            } else {
                ((1.0 - (-2.0 * t + 2.0).powi(2)).max(0.0).sqrt() + 1.0) / 2.0
            }
        }

        EaseInBack => {
            let c1 = 1.70158;
            let c3 = c1 + 1.0;
            c3 * t.powi(3) - c1 * t * t
        }
        EaseOutBack => {
            let c1 = 1.70158;
            let c3 = c1 + 1.0;
            1.0 + c3 * (t - 1.0).powi(3) + c1 * (t - 1.0).powi(2)
        }
        EaseInOutBack => {
            let c2 = 1.70158 * 1.525;
            if t < 0.5 {
                ((2.0 * t).powi(2) * ((c2 + 1.0) * 2.0 * t - c2)) / 2.0
            } else {
                ((2.0 * t - 2.0).powi(2) * ((c2 + 1.0) * (t * 2.0 - 2.0) + c2) + 2.0) / 2.0
            }
        }

        EaseInElastic => {
            let c4 = (2.0 * PI) / 3.0;
            if t == 0.0 || t == 1.0 {
                t
            } else {
                -(2f64.powf(10.0 * t - 10.0)) * ((t * 10.0 - 10.75) * c4).sin()
            }
        }
        EaseOutElastic => {
            let c4 = (2.0 * PI) / 3.0;
            if t == 0.0 || t == 1.0 {
                t
            } else {
                2f64.powf(-10.0 * t) * ((t * 10.0 - 0.75) * c4).sin() + 1.0
            }
        }
        EaseInOutElastic => {
            let c5 = (2.0 * PI) / 4.5;
            if t == 0.0 || t == 1.0 {
                t
            } else if t < 0.5 {
                -(2f64.powf(20.0 * t - 10.0) * ((20.0 * t - 11.125) * c5).sin()) / 2.0
            } else {
                (2f64.powf(-20.0 * t + 10.0) * ((20.0 * t - 11.125) * c5).sin()) / 2.0 + 1.0
            }
        }

        EaseInBounce => 1.0 - bounce_out(1.0 - t),
        EaseOutBounce => bounce_out(t),
        EaseInOutBounce => {
            if t < 0.5 {
                (1.0 - bounce_out(1.0 - 2.0 * t)) / 2.0
            } else {
                (1.0 + bounce_out(2.0 * t - 1.0)) / 2.0
            }
        }
    }
}

fn in_out_power(t: f64, n: i32) -> f64 {
    if t < 0.5 {
        2f64.powi(n - 1) * t.powi(n)
    } else {
        1.0 - (-2.0 * t + 2.0).powi(n) / 2.0
    }
}

fn bounce_out(t: f64) -> f64 {
    let n1 = 7.5625;
    let d1 = 2.75;
    if t < 1.0 / d1 {
        n1 * t * t
    } else if t < 2.0 / d1 {
        let t = t - 1.5 / d1;
        n1 * t * t + 0.75
    } else if t < 2.5 / d1 {
        let t = t - 2.25 / d1;
        n1 * t * t + 0.9375
    } else {
        let t = t - 2.625 / d1;
        n1 * t * t + 0.984375
    }
}
