use glam::{Quat, Vec3};
use proptest::prelude::*;

use thengill_shared::{Body, Health, Scene, Score, Transform};

fn finite() -> impl Strategy<Value = f32> {
    -1.0e6f32..1.0e6f32
}

fn vec3() -> impl Strategy<Value = Vec3> {
    (finite(), finite(), finite()).prop_map(|(x, y, z)| Vec3::new(x, y, z))
}

proptest! {
    /// A component read back after add_component is the one written
    #[test]
    fn prop_add_then_get_returns_the_value(
        position in vec3(),
        scale in vec3(),
        angle in -3.0f32..3.0,
        score in any::<i32>(),
        radius in 0.0f32..100.0,
    ) {
        let mut scene = Scene::new("props");
        let entity = scene.add_entity();
        let transform = Transform {
            position,
            rotation: Quat::from_rotation_y(angle),
            scale,
        };
        scene.add_component(&entity, transform);
        scene.add_component(&entity, Score { score });
        scene.add_component(&entity, Body { velocity: Vec3::ZERO, radius });

        let expected_score = Score { score };
        prop_assert_eq!(scene.get_component_from_entity::<Transform>(&entity), Some(&transform));
        prop_assert_eq!(scene.get_component_from_entity::<Score>(&entity), Some(&expected_score));
        prop_assert_eq!(scene.get_component_from_entity::<Body>(&entity).map(|body| body.radius), Some(radius));
        prop_assert_eq!(scene.get_component_from_entity::<Health>(&entity), None);
        prop_assert_eq!(scene.component_count(&entity), 3);
    }

    /// Removing an entity removes all of its components and nothing else
    #[test]
    fn prop_remove_entity_clears_only_its_components(count in 1usize..20, victim in 0usize..20) {
        let victim = victim % count;
        let mut scene = Scene::new("props");
        let entities: Vec<_> = (0..count)
            .map(|index| {
                let entity = scene.add_entity();
                scene.add_component(&entity, Score { score: index as i32 });
                entity
            })
            .collect();

        scene.remove_entity(&entities[victim]);

        prop_assert!(!scene.is_alive(&entities[victim]));
        prop_assert_eq!(scene.get_components::<Score>().len(), count - 1);
        for (index, entity) in entities.iter().enumerate() {
            if index != victim {
                let expected = Score { score: index as i32 };
                prop_assert_eq!(scene.get_component_from_entity::<Score>(entity), Some(&expected));
            }
        }
    }
}
