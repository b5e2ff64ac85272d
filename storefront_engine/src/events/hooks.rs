use std::{future::Future, pin::Pin, sync::Arc};

use log::debug;

use crate::{
    config::EngineConfig,
    db_types::BalanceTransaction,
    events::{BalanceChangedEvent, EventHandler, EventProducer, GamesPurchasedEvent, Handler},
};

#[derive(Default, Clone)]
pub struct EventProducers {
    pub games_purchased_producer: Vec<EventProducer<GamesPurchasedEvent>>,
    pub balance_changed_producer: Vec<EventProducer<BalanceChangedEvent>>,
}

impl EventProducers {
    pub fn publish_games_purchased(&self, event: GamesPurchasedEvent) {
        for producer in &self.games_purchased_producer {
            producer.publish_event(event.clone());
        }
    }

    pub fn publish_balance_changed(&self, transaction: &BalanceTransaction) {
        for producer in &self.balance_changed_producer {
            producer.publish_event(BalanceChangedEvent::new(transaction.clone()));
        }
    }
}

pub struct EventHandlers {
    pub on_games_purchased: Option<EventHandler<GamesPurchasedEvent>>,
    pub on_balance_changed: Option<EventHandler<BalanceChangedEvent>>,
}

impl EventHandlers {
    pub fn new(buffer_size: usize, hooks: EventHooks) -> Self {
        let on_games_purchased = hooks.on_games_purchased.map(|f| EventHandler::new(buffer_size, f));
        let on_balance_changed = hooks.on_balance_changed.map(|f| EventHandler::new(buffer_size, f));
        Self { on_games_purchased, on_balance_changed }
    }

    /// Builds the handlers with the queue depth given by [`EngineConfig::event_buffer_size`].
    pub fn from_config(config: &EngineConfig, hooks: EventHooks) -> Self {
        Self::new(config.event_buffer_size, hooks)
    }

    pub fn producers(&self) -> EventProducers {
        let mut result = EventProducers::default();
        if let Some(handler) = &self.on_games_purchased {
            result.games_purchased_producer.push(handler.subscribe());
        }
        if let Some(handler) = &self.on_balance_changed {
            result.balance_changed_producer.push(handler.subscribe());
        }
        result
    }

    /// Spawns a task per registered hook. Each task ends once every producer handed out by
    /// [`EventHandlers::producers`] has been dropped.
    pub fn start_handlers(self) -> Vec<tokio::task::JoinHandle<()>> {
        let mut tasks = Vec::with_capacity(2);
        if let Some(handler) = self.on_games_purchased {
            debug!("📬️ Starting games-purchased hook with room for {} events", handler.capacity());
            tasks.push(tokio::spawn(handler.start_handler()));
        }
        if let Some(handler) = self.on_balance_changed {
            debug!("📬️ Starting balance-changed hook with room for {} events", handler.capacity());
            tasks.push(tokio::spawn(handler.start_handler()));
        }
        tasks
    }
}

#[derive(Default, Clone)]
pub struct EventHooks {
    pub on_games_purchased: Option<Handler<GamesPurchasedEvent>>,
    pub on_balance_changed: Option<Handler<BalanceChangedEvent>>,
}

impl EventHooks {
    pub fn on_games_purchased<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(GamesPurchasedEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_games_purchased = Some(Arc::new(f));
        self
    }

    pub fn on_balance_changed<F>(&mut self, f: F) -> &mut Self
    where F: (Fn(BalanceChangedEvent) -> Pin<Box<dyn Future<Output = ()> + Send>>) + Send + Sync + 'static {
        self.on_balance_changed = Some(Arc::new(f));
        self
    }
}
