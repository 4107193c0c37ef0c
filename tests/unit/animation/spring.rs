use super::*;

fn tick(spring: &mut Spring, ticks: u32) {
    for _ in 0..ticks {
        spring.step(Duration::from_millis(16));
    }
}

#[test]
fn starts_settled_at_initial_position() {
    let spring = Spring::new(0.5, SpringOpts::default()).unwrap();
    assert!(spring.is_settled());
    assert_eq!(spring.position(), 0.5);
}

#[test]
fn settles_onto_target() {
    let mut spring = Spring::new(0.0, SpringOpts::default()).unwrap();
    spring.set_target(1.0);
    tick(&mut spring, 300);
    assert!(spring.is_settled());
    assert_eq!(spring.position(), 1.0);
    assert_eq!(spring.velocity(), 0.0);
}

#[test]
fn default_preset_does_not_overshoot() {
    let mut spring = Spring::new(0.0, SpringOpts::default()).unwrap();
    spring.set_target(1.0);
    for _ in 0..300 {
        let position = spring.step(Duration::from_millis(16));
        assert!(position <= 1.0 + 1e-3, "overshoot to {position}");
    }
}

#[test]
fn reduced_motion_preset_settles_faster() {
    let mut default = Spring::new(0.0, SpringOpts::default()).unwrap();
    let mut reduced = Spring::new(0.0, SpringOpts::reduced_motion()).unwrap();
    default.set_target(1.0);
    reduced.set_target(1.0);

    let ticks_until_settled = |spring: &mut Spring| {
        let mut n = 0u32;
        while !spring.is_settled() && n < 1000 {
            spring.step(Duration::from_millis(16));
            n += 1;
        }
        n
    };
    assert!(ticks_until_settled(&mut reduced) < ticks_until_settled(&mut default));
}

#[test]
fn retarget_preserves_position_and_velocity() {
    let mut spring = Spring::new(0.0, SpringOpts::default()).unwrap();
    spring.set_target(1.0);
    tick(&mut spring, 10);
    let position = spring.position();
    let velocity = spring.velocity();
    assert!(position > 0.0 && position < 1.0);

    spring.set_target(0.0);
    assert_eq!(spring.position(), position);
    assert_eq!(spring.velocity(), velocity);

    tick(&mut spring, 500);
    assert_eq!(spring.position(), 0.0);
}

#[test]
fn invalid_opts_are_rejected() {
    let opts = SpringOpts {
        stiffness: 0.0,
        ..SpringOpts::default()
    };
    assert!(Spring::new(0.0, opts).is_err());

    let opts = SpringOpts {
        damping: -1.0,
        ..SpringOpts::default()
    };
    assert!(Spring::new(0.0, opts).is_err());

    let opts = SpringOpts {
        rest_delta: 0.0,
        ..SpringOpts::default()
    };
    assert!(Spring::new(0.0, opts).is_err());

    let opts = SpringOpts {
        mass: f64::NAN,
        ..SpringOpts::default()
    };
    assert!(Spring::new(0.0, opts).is_err());
}
