//! Order request, view and event types shared between the engine and clients

pub mod event;
pub mod request;
pub mod view;

pub use event::{OrderEvent, OrderEventKind};
pub use request::{
    AddonInput, ApplyDiscountRequest, ChangeStatusRequest, CreateOrderRequest, CustomItemInput,
    CustomerInput, DeliveryStatusRequest, EditOrderRequest, OrderItemInput, VoucherInput,
};
pub use view::{
    CustomerView, DeliveryView, OrderItemView, OrderView, ReservationView, TotalsView,
};
