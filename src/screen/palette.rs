//! Colours for the house model's material slots.

use crate::data_structures::{colour::Colour, model::MaterialAttributes};

pub const HOUSE_PALETTE: [Colour; 18] = [
    Colour::BROWN,
    Colour::TAN,
    Colour::FIREBRICK,
    Colour::BROWN,
    Colour::TAN,
    Colour::BROWN,
    Colour::FOREST,
    Colour::YELLOW,
    Colour::DARK_GRAY,
    Colour::BROWN,
    Colour::GREEN,
    Colour::SKY,
    Colour::DARK_GRAY,
    Colour::DARK_GRAY,
    Colour::GREEN,
    Colour::BROWN,
    Colour::BROWN,
    Colour::FOREST,
];

/// The pond; drawn see-through.
pub const WATER_SLOT: usize = 11;
pub const WATER_OPACITY: f32 = 0.75;

/// Replace the diffuse colour of each slot, in material order.
///
/// Returns how many slots were painted. Slots the model does not have are
/// skipped with a warning; extra materials keep their own colour.
pub fn paint<'a>(materials: impl IntoIterator<Item = &'a mut MaterialAttributes>) -> usize {
    let mut painted = 0;
    for (slot, attributes) in materials.into_iter().take(HOUSE_PALETTE.len()).enumerate() {
        attributes.diffuse = HOUSE_PALETTE[slot];
        if slot == WATER_SLOT {
            attributes.opacity = Some(WATER_OPACITY);
        }
        painted += 1;
    }
    if painted < HOUSE_PALETTE.len() {
        log::warn!(
            "model has {painted} materials, palette slots {painted}..{} were skipped",
            HOUSE_PALETTE.len()
        );
    }
    painted
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_structures::instance::DrawOrder;

    #[test]
    fn paints_every_slot() {
        let mut materials = vec![MaterialAttributes::default(); 18];
        assert_eq!(paint(materials.iter_mut()), 18);
        assert_eq!(materials[0].diffuse, Colour::BROWN);
        assert_eq!(materials[2].diffuse, Colour::FIREBRICK);
        assert_eq!(materials[17].diffuse, Colour::FOREST);
    }

    #[test]
    fn only_water_is_blended() {
        let mut materials = vec![MaterialAttributes::default(); 18];
        paint(materials.iter_mut());
        for (slot, m) in materials.iter().enumerate() {
            assert_eq!(m.is_transparent(), slot == WATER_SLOT, "slot {slot}");
        }
        assert_eq!(materials[WATER_SLOT].diffuse, Colour::SKY);
        assert_eq!(materials[WATER_SLOT].to_uniform().diffuse[3], 0.75);
    }

    #[test]
    fn water_meshes_move_to_the_blended_batch() {
        let mut materials = vec![MaterialAttributes::default(); 18];
        let mesh_materials = [0, WATER_SLOT, 6, WATER_SLOT];
        assert!(DrawOrder::new(&mesh_materials, &materials).blended.is_empty());

        paint(materials.iter_mut());
        let order = DrawOrder::new(&mesh_materials, &materials);
        assert_eq!(order.opaque, vec![0, 2]);
        assert_eq!(order.blended, vec![1, 3]);
    }

    #[test]
    fn short_models_are_painted_partially() {
        let mut materials = vec![MaterialAttributes::default(); 5];
        assert_eq!(paint(materials.iter_mut()), 5);
        assert_eq!(materials[4].diffuse, Colour::TAN);
    }

    #[test]
    fn extra_materials_are_left_alone() {
        let mut materials = vec![MaterialAttributes::default(); 20];
        paint(materials.iter_mut());
        assert_eq!(materials[18], MaterialAttributes::default());
    }
}
