/// Asserts that the snake with the given ID is alive with the given size.
#[macro_export]
macro_rules! assert_snake_size {
    ($world:expr, $id:expr, $size:expr) => {
        let snake = $world.snake($id).expect("Snake not found in world");
        assert!(snake.alive, "Snake {} is dead", $id);
        assert_eq!(snake.size, $size, "Snake {} size mismatch", $id);
    };
}

/// Asserts that the snake with the given ID is gone (dead and removed).
#[macro_export]
macro_rules! assert_snake_dead {
    ($world:expr, $id:expr) => {
        assert!(
            $world.snake($id).is_none(),
            "Snake {} should be dead but was found alive",
            $id
        );
    };
}

/// Asserts the number of live snakes.
#[macro_export]
macro_rules! assert_population {
    ($world:expr, $count:expr) => {
        assert_eq!(
            $world.state.live_snake_count(),
            $count,
            "Population count mismatch"
        );
    };
}
