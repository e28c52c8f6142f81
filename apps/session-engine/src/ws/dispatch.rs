//! Routes named requests to session operations.
//!
//! To add an action: write a handler with the `Handler` signature and add a
//! `Route` entry below. Names are stable wire identifiers; keep them unique.

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use crate::domain::pending::{ActionOutcome, Resolution};
use crate::domain::player::PlayOutcome;
use crate::error::DispatchError;
use crate::errors::ErrorKind;
use crate::session::{Game, TurnOutcome};
use crate::ws::protocol::{
    ActionReply, BirdParams, ChooseBirdsParams, ChooseFoodParams, DiscardFoodParams,
    DrawFromTrayParams, LayEggsParams, Notification, PayBirdCostParams, Request,
};
use crate::ws::registry::SessionRegistry;
use crate::ws::socket::{Socket, SocketId};

pub type Handler = fn(&Game, SocketId, Value) -> Result<ActionReply, DispatchError>;

/// One routable action.
pub struct Route {
    pub method: &'static str,
    pub handle: Handler,
}

static ROUTES: &[Route] = &[
    Route {
        method: "game.choose_birds",
        handle: choose_birds,
    },
    Route {
        method: "game.discard_food",
        handle: discard_food,
    },
    Route {
        method: "game.end_turn",
        handle: end_turn,
    },
    Route {
        method: "game.draw_cards",
        handle: draw_cards,
    },
    Route {
        method: "game.draw_from_tray",
        handle: draw_from_tray,
    },
    Route {
        method: "game.draw_from_deck",
        handle: draw_from_deck,
    },
    Route {
        method: "game.gain_food",
        handle: gain_food,
    },
    Route {
        method: "game.choose_food",
        handle: choose_food,
    },
    Route {
        method: "game.lay_eggs",
        handle: lay_eggs,
    },
    Route {
        method: "game.lay_eggs_on_birds",
        handle: lay_eggs_on_birds,
    },
    Route {
        method: "game.play_bird",
        handle: play_bird,
    },
    Route {
        method: "game.pay_bird_cost",
        handle: pay_bird_cost,
    },
    Route {
        method: "game.activate_power",
        handle: activate_power,
    },
];

/// Returns every registered route.
pub fn routes() -> &'static [Route] {
    ROUTES
}

/// Finds a route by its method name.
pub fn by_name(method: &str) -> Option<&'static Route> {
    routes().iter().find(|route| route.method == method)
}

/// Resolves requests against a registry and reports failures to the caller.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActionRouter;

impl ActionRouter {
    pub fn new() -> Self {
        Self
    }

    pub fn methods(&self) -> Vec<&'static str> {
        routes().iter().map(|route| route.method).collect()
    }

    /// Runs the request. Failures are also sent to `socket` as an error notification.
    pub fn route(
        &self,
        registry: &SessionRegistry,
        socket: &dyn Socket,
        request: Request,
    ) -> Result<ActionReply, DispatchError> {
        let match_id = request.match_id;
        let method = request.method.clone();
        let result = self.dispatch(registry, socket.id(), request);

        if let Err(err) = &result {
            match err {
                DispatchError::Game(game_err) if game_err.kind() != ErrorKind::Logic => {
                    debug!(%match_id, %method, socket_id = %socket.id(), error = %err, "Action rejected");
                }
                _ => {
                    warn!(%match_id, %method, socket_id = %socket.id(), error = %err, "Action failed");
                }
            }
            let notice = Notification::Error {
                code: err.code(),
                message: err.to_string(),
            };
            if socket.send(notice).is_err() {
                debug!(socket_id = %socket.id(), "Error notice dropped; socket closed");
            }
        }
        result
    }

    /// Runs the request without reporting.
    pub fn dispatch(
        &self,
        registry: &SessionRegistry,
        socket: SocketId,
        request: Request,
    ) -> Result<ActionReply, DispatchError> {
        let route = by_name(&request.method)
            .ok_or_else(|| DispatchError::unknown_action(&request.method))?;
        let game = registry
            .get(request.match_id)
            .ok_or_else(|| DispatchError::session_not_found(request.match_id.to_string()))?;
        (route.handle)(&game, socket, request.params)
    }
}

fn params<P: DeserializeOwned>(value: Value) -> Result<P, DispatchError> {
    let value = match value {
        Value::Null => Value::Object(Default::default()),
        other => other,
    };
    Ok(serde_json::from_value(value)?)
}

fn choose_birds(game: &Game, socket: SocketId, raw: Value) -> Result<ActionReply, DispatchError> {
    let p: ChooseBirdsParams = params(raw)?;
    game.choose_birds(socket, &p.birds)?;
    Ok(ActionReply::Ok)
}

fn discard_food(game: &Game, socket: SocketId, raw: Value) -> Result<ActionReply, DispatchError> {
    let p: DiscardFoodParams = params(raw)?;
    game.discard_food(socket, &p.food)?;
    Ok(ActionReply::Ok)
}

fn end_turn(game: &Game, socket: SocketId, _: Value) -> Result<ActionReply, DispatchError> {
    Ok(game.end_turn(socket)?.into())
}

fn draw_cards(game: &Game, socket: SocketId, _: Value) -> Result<ActionReply, DispatchError> {
    Ok(game.draw_cards(socket)?.into())
}

fn draw_from_tray(game: &Game, socket: SocketId, raw: Value) -> Result<ActionReply, DispatchError> {
    let p: DrawFromTrayParams = params(raw)?;
    Ok(game.draw_from_tray(socket, p.birds)?.into())
}

fn draw_from_deck(game: &Game, socket: SocketId, _: Value) -> Result<ActionReply, DispatchError> {
    Ok(game.draw_from_deck(socket)?.into())
}

fn gain_food(game: &Game, socket: SocketId, _: Value) -> Result<ActionReply, DispatchError> {
    Ok(game.gain_food(socket)?.into())
}

fn choose_food(game: &Game, socket: SocketId, raw: Value) -> Result<ActionReply, DispatchError> {
    let p: ChooseFoodParams = params(raw)?;
    Ok(game.choose_food(socket, p.food)?.into())
}

fn lay_eggs(game: &Game, socket: SocketId, _: Value) -> Result<ActionReply, DispatchError> {
    Ok(game.lay_eggs(socket)?.into())
}

fn lay_eggs_on_birds(
    game: &Game,
    socket: SocketId,
    raw: Value,
) -> Result<ActionReply, DispatchError> {
    let p: LayEggsParams = params(raw)?;
    Ok(game.lay_eggs_on_birds(socket, p.eggs)?.into())
}

fn play_bird(game: &Game, socket: SocketId, raw: Value) -> Result<ActionReply, DispatchError> {
    let p: BirdParams = params(raw)?;
    Ok(game.play_bird(socket, p.bird)?.into())
}

fn pay_bird_cost(game: &Game, socket: SocketId, raw: Value) -> Result<ActionReply, DispatchError> {
    let p: PayBirdCostParams = params(raw)?;
    let bird = game.pay_bird_cost(socket, p.bird, &p.food, &p.eggs)?;
    Ok(ActionReply::Played { bird })
}

fn activate_power(game: &Game, socket: SocketId, raw: Value) -> Result<ActionReply, DispatchError> {
    let p: BirdParams = params(raw)?;
    game.activate_power(socket, p.bird)?;
    Ok(ActionReply::Ok)
}

impl From<ActionOutcome> for ActionReply {
    fn from(outcome: ActionOutcome) -> Self {
        match outcome {
            ActionOutcome::FoodGained(food) => ActionReply::FoodGained { food },
            ActionOutcome::CardsDrawn(birds) => ActionReply::CardsDrawn { birds },
            ActionOutcome::EggsLaid(eggs) => ActionReply::EggsLaid { eggs },
        }
    }
}

impl From<Resolution> for ActionReply {
    fn from(resolution: Resolution) -> Self {
        match resolution {
            Resolution::Resolved(outcome) => outcome.into(),
            Resolution::Prompted => ActionReply::Prompted,
        }
    }
}

impl From<PlayOutcome> for ActionReply {
    fn from(outcome: PlayOutcome) -> Self {
        match outcome {
            PlayOutcome::Played(bird) => ActionReply::Played { bird },
            PlayOutcome::AwaitingPayment => ActionReply::AwaitingPayment,
        }
    }
}

impl From<TurnOutcome> for ActionReply {
    fn from(outcome: TurnOutcome) -> Self {
        match outcome {
            TurnOutcome::Continued => ActionReply::TurnEnded,
            TurnOutcome::RoundEnded => ActionReply::RoundEnded,
            TurnOutcome::GameOver(result) => ActionReply::GameOver { result },
        }
    }
}
