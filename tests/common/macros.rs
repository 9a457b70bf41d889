/// Asserts that the organism behind `$id` is still alive.
#[macro_export]
macro_rules! assert_alive {
    ($world:expr, $id:expr) => {
        assert!(
            $world.organisms().is_valid($id),
            "organism {} should be alive",
            $id
        );
    };
}

/// Asserts that the organism behind `$id` died (or its slot was reused).
#[macro_export]
macro_rules! assert_dead {
    ($world:expr, $id:expr) => {
        assert!(
            !$world.organisms().is_valid($id),
            "organism {} should be dead but is alive",
            $id
        );
    };
}

/// Asserts the alive organism count.
#[macro_export]
macro_rules! assert_population {
    ($world:expr, $count:expr) => {
        assert_eq!($world.alive_count(), $count, "population count mismatch");
    };
}
