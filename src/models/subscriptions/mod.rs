pub mod entities;
pub mod requests;
pub mod responses;

pub use entities::{
    EffectiveStatus, StudentSubscription, SubscriptionStatus, SubscriptionType, effective_status,
};
pub use requests::{
    CreateSubscriptionTypeRequest, NewSubscription, PurchaseSubscriptionRequest,
    SubscriptionAction, SubscriptionPatch, SubscriptionQueryParams, SubscriptionTypeQueryParams,
    UpdateSubscriptionRequest, UpdateSubscriptionTypeRequest,
};
pub use responses::PurchaseSubscriptionResponse;
