use crate::model::PlayerRecord;

/// Performance per million.
pub fn value(player: &PlayerRecord) -> f64 {
    value_of(player.performance_score, player.price)
}

pub fn value_of(performance_score: f64, price: f64) -> f64 {
    if !(price > 0.0) {
        return 0.0;
    }
    performance_score / price
}
