//! The built-in menu flow

use super::types::RoutineStep;

/// Open the terminal, then walk the city list down to the first dark age stage
pub fn default_steps() -> Vec<RoutineStep> {
    vec![
        RoutineStep::new("pic/start.png", "open terminal"),
        RoutineStep::new("pic/all citys.png", "city list"),
        RoutineStep::new("pic/citys/darktime.png", "dark age"),
        RoutineStep::new("pic/citys/darktime/01.png", "dark age 01"),
    ]
}
