use std::{cell::RefCell, rc::Rc};

use thengill_shared::{FrameTime, Label, MenuCommand, MenuInput, Scene, System, Transition};

/// Commands are ignored for this long after the summary appears.
const INPUT_COOLDOWN: f64 = 0.2;

/// How a round went for the local player.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RoundSummary {
    /// Seconds the round lasted
    pub elapsed: f64,
    pub score: i32,
    pub won: bool,
}

impl RoundSummary {
    pub fn lines(&self) -> Vec<String> {
        vec![
            if self.won { "You won!" } else { "You lost!" }.to_string(),
            format!("Time: {:.1} s", self.elapsed),
            format!("Score: {}", self.score),
            "Return".to_string(),
        ]
    }
}

/// Shows a RoundSummary until the player confirms.
pub struct SummarySystem {
    summary: RoundSummary,
    input: Rc<RefCell<dyn MenuInput>>,
    elapsed: f64,
}

impl SummarySystem {
    pub fn new(summary: RoundSummary, input: Rc<RefCell<dyn MenuInput>>) -> Self {
        Self {
            summary,
            input,
            elapsed: 0.0,
        }
    }
}

impl System for SummarySystem {
    fn name(&self) -> &str {
        "SummarySystem"
    }

    fn init(&mut self, scene: &mut Scene) {
        let lines = self.summary.lines();
        let last = lines.len() - 1;
        for (index, text) in lines.into_iter().enumerate() {
            let entity = scene.add_entity();
            scene.add_component(
                &entity,
                Label {
                    text,
                    highlighted: index == last,
                },
            );
        }
    }

    fn update(&mut self, scene: &mut Scene, time: &FrameTime) {
        self.elapsed += time.dt;
        let commands = self.input.borrow_mut().poll();
        if self.elapsed < INPUT_COOLDOWN {
            return;
        }
        let confirmed = commands
            .iter()
            .any(|command| matches!(command, MenuCommand::Select | MenuCommand::Back));
        if confirmed {
            scene.request_transition(Transition::Pop);
        }
    }
}
