use crate::domain::campaign::ports::DispatchService;
use crate::domain::subscription::ports::SubscriptionService;
use secrecy::Secret;
use std::sync::Arc;

pub struct SubscriptionState<SS: SubscriptionService> {
    subscription_service: SS,
}

pub struct SharedSubscriptionState<SS: SubscriptionService>(Arc<SubscriptionState<SS>>);

// Manual impl: the service type itself does not have to be `Clone`, only
// the handle is.
impl<SS: SubscriptionService> Clone for SharedSubscriptionState<SS> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<SS: SubscriptionService> SharedSubscriptionState<SS> {
    pub fn new(subscription_service: SS) -> Self {
        Self(Arc::new(SubscriptionState {
            subscription_service,
        }))
    }

    pub fn subscription_service(&self) -> &SS {
        &self.0.subscription_service
    }
}

pub struct DispatchState<DS: DispatchService> {
    dispatch_service: DS,
    trigger_token: Secret<String>,
}

pub struct SharedDispatchState<DS: DispatchService>(Arc<DispatchState<DS>>);

impl<DS: DispatchService> Clone for SharedDispatchState<DS> {
    fn clone(&self) -> Self {
        Self(Arc::clone(&self.0))
    }
}

impl<DS: DispatchService> SharedDispatchState<DS> {
    pub fn new(dispatch_service: DS, trigger_token: Secret<String>) -> Self {
        Self(Arc::new(DispatchState {
            dispatch_service,
            trigger_token,
        }))
    }

    pub fn dispatch_service(&self) -> &DS {
        &self.0.dispatch_service
    }

    pub fn trigger_token(&self) -> &Secret<String> {
        &self.0.trigger_token
    }
}
