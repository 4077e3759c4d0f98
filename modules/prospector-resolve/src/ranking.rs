use crate::entity::CanonicalEntity;

/// Order entities for outreach: contactable first, then by combined
/// audience, both descending. Stable, so ties keep discovery order.
pub fn rank(entities: &mut [CanonicalEntity]) {
    entities.sort_by(|a, b| {
        (b.has_email(), b.audience_size()).cmp(&(a.has_email(), a.audience_size()))
    });
}
