//! Política de precios
//!
//! El precio es una propiedad derivada del viaje, nunca un campo almacenado.

use rust_decimal::Decimal;

use crate::models::Ride;
use crate::services::stop_queue::StopQueue;

pub trait PricingPolicy: Send + Sync {
    fn quote(&self, ride: &Ride, queue: &StopQueue) -> Decimal;
}

/// Tarifa plana, independiente del recorrido
#[derive(Debug, Clone)]
pub struct FlatRatePricing {
    price: Decimal,
}

impl FlatRatePricing {
    pub fn new(price: Decimal) -> Self {
        Self { price }
    }
}

impl PricingPolicy for FlatRatePricing {
    fn quote(&self, _ride: &Ride, _queue: &StopQueue) -> Decimal {
        self.price
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    #[test]
    fn test_flat_rate_ignores_the_route() {
        let pricing = FlatRatePricing::new(Decimal::from(1337));
        let ride = Ride::new(Uuid::new_v4(), Utc::now());

        assert_eq!(pricing.quote(&ride, &StopQueue::default()), Decimal::from(1337));
    }
}
