//! Alternating-sides match loop over a sandbox world.

use anyhow::Result;
use game_core::{Commit, SandboxWorld, TacticsConfig, Team, World};
use tactics::{Directive, TacticsContext, Tactician, TurnSummary};

/// One strategy instance and the context it carries between turns.
struct Side {
    team: Team,
    tactician: Tactician,
    ctx: TacticsContext,
}

/// What happened in one round: one turn per playing side.
#[derive(Clone, Debug)]
pub struct RoundReport {
    pub round: u64,
    pub turns: Vec<(Team, TurnSummary)>,
    pub commits: Vec<Commit>,
}

impl RoundReport {
    pub fn count(&self, directive: Directive) -> usize {
        self.turns
            .iter()
            .map(|(_, summary)| summary.count(directive))
            .sum()
    }
}

pub struct Match {
    world: SandboxWorld,
    sides: Vec<Side>,
}

impl Match {
    /// Sets up both sides with the same configuration, the world's ally first.
    pub fn new(world: SandboxWorld, config: &TacticsConfig, solo: bool) -> Result<Self> {
        let first = world.ally_team();
        let teams = if solo {
            vec![first]
        } else {
            vec![first, first.opponent()]
        };

        let sides = teams
            .into_iter()
            .map(|team| {
                Ok(Side {
                    team,
                    tactician: Tactician::new(config.clone())?,
                    ctx: TacticsContext::new(),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(Self { world, sides })
    }

    pub fn world(&self) -> &SandboxWorld {
        &self.world
    }

    pub fn play_round(&mut self) -> RoundReport {
        self.world.begin_turn();
        let round = self.world.turn();

        let mut turns = Vec::with_capacity(self.sides.len());
        for side in &mut self.sides {
            self.world.set_ally_team(side.team);
            side.tactician.play_turn(&mut self.world, &mut side.ctx);
            if let Some(summary) = side.ctx.last_summary() {
                turns.push((side.team, summary.clone()));
            }
        }
        if let Some(first) = self.sides.first() {
            self.world.set_ally_team(first.team);
        }

        let commits = self.world.take_log();
        for commit in &commits {
            tracing::debug!("round {}: {}", round, commit);
        }
        tracing::info!(
            "round {}: {} commits, {} engaging, {} retreating",
            round,
            commits.len(),
            turns
                .iter()
                .map(|(_, s)| s.count(Directive::Engaging))
                .sum::<usize>(),
            turns
                .iter()
                .map(|(_, s)| s.count(Directive::Retreating))
                .sum::<usize>()
        );

        RoundReport {
            round,
            turns,
            commits,
        }
    }
}
