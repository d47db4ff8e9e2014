use nebula::{Mood, Session, SessionOpts, Viewport};

fn run(mood: Mood, seed: u64, ticks: u64) -> Vec<u8> {
    let opts = SessionOpts {
        seed,
        ..SessionOpts::default()
    };
    let mut session = Session::mount(mood, Viewport::new(96, 54), opts).unwrap();
    for _ in 0..ticks {
        session.tick().unwrap();
    }
    session.surface().unwrap().data().to_vec()
}

#[test]
fn identical_inputs_render_identical_surfaces() {
    let a = run(Mood::Sound, 7, 50);
    let b = run(Mood::Sound, 7, 50);
    assert_eq!(a, b);
}

#[test]
fn different_seeds_render_different_surfaces() {
    let a = run(Mood::Sound, 7, 50);
    let b = run(Mood::Sound, 8, 50);
    assert_ne!(a, b);
}

#[test]
fn different_moods_render_different_surfaces() {
    let a = run(Mood::Sound, 7, 50);
    let b = run(Mood::Visions, 7, 50);
    assert_ne!(a, b);
}
