const NUM_OF_OPERATIONS: usize = 10_000;
const VALIDATE_EVERY: usize = 97;

fn avl_height_bound(len: usize) -> f64 {
    1.44 * ((len + 2) as f64).log2()
}

fn red_black_height_bound(len: usize) -> f64 {
    2.0 * ((len + 1) as f64).log2()
}

macro_rules! bst_set_tests {
    ($($module_name:ident: $type_name:ident, $height_bound:ident,)*) => {
        $(
            mod $module_name {
                use ordered_index::$module_name::$type_name;
                use ordered_index::OrderedIndex;
                use rand::Rng;
                use std::collections::BTreeSet;
                use super::{$height_bound, NUM_OF_OPERATIONS, VALIDATE_EVERY};

                fn assert_matches(set: &$type_name<u32>, expected: &BTreeSet<u32>) {
                    assert_eq!(set.validate(), Ok(()));
                    assert_eq!(set.len(), expected.len());
                    assert_eq!(
                        set.iter().collect::<Vec<&u32>>(),
                        expected.iter().collect::<Vec<&u32>>(),
                    );
                    assert!((set.height() as f64) <= $height_bound(set.len()));
                }

                #[test]
                fn int_test_scenario() {
                    let mut set = $type_name::new();
                    for key in &[5, 3, 8, 1, 4, 7, 9] {
                        assert!(set.insert(*key));
                    }
                    assert_eq!(set.validate(), Ok(()));
                    assert_eq!(set.in_order(), vec![&1, &3, &4, &5, &7, &8, &9]);

                    assert!(set.remove(&3));
                    assert_eq!(set.validate(), Ok(()));
                    assert_eq!(set.in_order(), vec![&1, &4, &5, &7, &8, &9]);
                    assert!(!set.contains(&3));
                    assert!(set.contains(&8));
                }

                #[test]
                fn int_test_ascending() {
                    let mut set = $type_name::new();
                    for key in 1..=1000u32 {
                        set.insert(key);
                    }
                    assert_eq!(set.validate(), Ok(()));
                    assert_eq!(set.len(), 1000);
                    assert!((set.height() as f64) <= $height_bound(1000));
                    assert_eq!(set.min(), Some(&1));
                    assert_eq!(set.max(), Some(&1000));
                }

                #[test]
                fn int_test_descending_then_drain() {
                    let mut set = $type_name::new();
                    for key in (1..=1000u32).rev() {
                        set.insert(key);
                    }
                    assert!((set.height() as f64) <= $height_bound(1000));

                    for key in 1..=1000u32 {
                        assert!(set.remove(&key));
                        if key as usize % VALIDATE_EVERY == 0 {
                            assert_eq!(set.validate(), Ok(()));
                        }
                    }
                    assert!(set.is_empty());
                    assert_eq!(set.height(), 0);
                    assert_eq!(set.validate(), Ok(()));
                }

                #[test]
                fn int_test_duplicate_insert() {
                    let mut rng: rand::XorShiftRng = rand::SeedableRng::from_seed([1, 1, 1, 1]);
                    let keys: Vec<u32> = (0..1000).map(|_| rng.gen_range(0, 500)).collect();

                    let mut once = $type_name::new();
                    let mut twice = $type_name::new();
                    for key in &keys {
                        once.insert(*key);
                        twice.insert(*key);
                        assert!(!twice.insert(*key));
                    }

                    assert_eq!(once, twice);
                    assert_eq!(twice.validate(), Ok(()));
                }

                #[test]
                fn int_test_remove_reinsert() {
                    let mut set: $type_name<u32> = (0..200).collect();
                    for key in (0..200).step_by(7) {
                        assert!(set.remove(&key));
                        assert!(!set.contains(&key));
                        assert!(!set.remove(&key));
                        assert!(set.insert(key));
                        assert!(set.contains(&key));
                    }
                    assert_eq!(set.validate(), Ok(()));
                    assert_eq!(set.into_iter().collect::<Vec<u32>>(), (0..200).collect::<Vec<u32>>());
                }

                #[test]
                fn int_test_random_operations() {
                    let mut rng: rand::XorShiftRng = rand::SeedableRng::from_seed([1, 2, 3, 4]);
                    let mut set = $type_name::new();
                    let mut expected = BTreeSet::new();

                    for i in 0..NUM_OF_OPERATIONS {
                        let key = rng.gen_range(0, 2_000);
                        if rng.gen_range(0, 3) == 0 {
                            assert_eq!(set.remove(&key), expected.remove(&key));
                        } else {
                            assert_eq!(set.insert(key), expected.insert(key));
                        }

                        let probe = rng.gen_range(0, 2_000);
                        assert_eq!(set.contains(&probe), expected.contains(&probe));

                        if i % VALIDATE_EVERY == 0 {
                            assert_matches(&set, &expected);
                        }
                    }
                    assert_matches(&set, &expected);

                    let mut keys: Vec<u32> = expected.iter().cloned().collect();
                    rng.shuffle(&mut keys);
                    for (i, key) in keys.iter().enumerate() {
                        assert_eq!(set.take(key), Some(*key));
                        expected.remove(key);
                        if i % VALIDATE_EVERY == 0 {
                            assert_matches(&set, &expected);
                        }
                    }
                    assert!(set.is_empty());
                }

                #[test]
                fn int_test_floor_ceil() {
                    let mut rng: rand::XorShiftRng = rand::SeedableRng::from_seed([4, 3, 2, 1]);
                    let mut set = $type_name::new();
                    let mut expected = BTreeSet::new();
                    for _ in 0..1000 {
                        let key = rng.gen_range(0, 10_000);
                        set.insert(key);
                        expected.insert(key);
                    }

                    for _ in 0..1000 {
                        let key = rng.gen_range(0, 10_000);
                        assert_eq!(set.floor(&key), expected.range(..=key).next_back());
                        assert_eq!(set.ceil(&key), expected.range(key..).next());
                    }
                }
            }
        )*
    }
}

bst_set_tests!(
    avl_tree: AvlSet, avl_height_bound,
    red_black_tree: RedBlackSet, red_black_height_bound,
);
