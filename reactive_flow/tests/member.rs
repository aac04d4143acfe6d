use reactive_flow::{
    cell::{Cell, Property},
    chain::ChainBuilder,
    error::FlowError,
    member::Members,
    prelude::*,
};
use std::{
    any::Any,
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, RwLock,
    },
};

#[derive(Debug, Clone, PartialEq)]
struct User {
    name: String,
    age: u32,
}

impl ArcResource for User {}

impl Members for User {
    fn read_member(&self, name: &str) -> Result<Box<dyn Any + Send>, FlowError> {
        match name {
            "name" => Ok(Box::new(self.name.clone())),
            "age" => Ok(Box::new(self.age)),
            _ => Err(FlowError::UnknownMember {
                name: name.to_string(),
            }),
        }
    }

    fn write_member(
        &mut self,
        name: &str,
        value: Box<dyn Any + Send>,
    ) -> Result<(), FlowError> {
        let mismatch = || FlowError::MemberTypeMismatch {
            name: name.to_string(),
        };
        match name {
            "name" => self.name = *value.downcast::<String>().map_err(|_| mismatch())?,
            "age" => self.age = *value.downcast::<u32>().map_err(|_| mismatch())?,
            _ => {
                return Err(FlowError::UnknownMember {
                    name: name.to_string(),
                })
            }
        }
        Ok(())
    }
}

fn ada() -> User {
    User {
        name: "Ada".to_string(),
        age: 36,
    }
}

#[test]
fn cells_read_and_write_members() {
    let user = Cell::new(ada());
    let hits = Arc::new(AtomicUsize::new(0));
    let owner = Arc::new(());
    user.subscribe(&owner, {
        let hits = Arc::clone(&hits);
        move || {
            hits.fetch_add(1, Ordering::Relaxed);
        }
    })
    .unwrap();

    let age = user.member("age").unwrap();
    assert_eq!(age.downcast_ref::<u32>(), Some(&36));

    user.set_member("age", Box::new(37_u32)).unwrap();
    assert_eq!(user.get().age, 37);
    assert_eq!(hits.load(Ordering::Relaxed), 1);

    // writing the same value back is not a change
    user.set_member("age", Box::new(37_u32)).unwrap();
    assert_eq!(hits.load(Ordering::Relaxed), 1);
}

#[test]
fn unknown_members_and_wrong_types_are_rejected() {
    let user = Cell::new(ada());
    assert_eq!(
        user.member("email").unwrap_err(),
        FlowError::UnknownMember {
            name: "email".to_string()
        }
    );
    assert_eq!(
        user.set_member("age", Box::new("old")).unwrap_err(),
        FlowError::MemberTypeMismatch {
            name: "age".to_string()
        }
    );
    assert_eq!(user.get(), ada());
}

#[test]
fn computed_nodes_are_read_only() {
    let user = Cell::new(ada());
    let older = user.map(|user| User {
        age: user.age + 1,
        ..user
    });

    let age = older.member("age").unwrap();
    assert_eq!(age.downcast_ref::<u32>(), Some(&37));
    assert!(matches!(
        older.set_member("age", Box::new(1_u32)),
        Err(FlowError::UnsupportedMutation { .. })
    ));

    let cached = user.cache(None).unwrap();
    assert!(matches!(
        cached.set_member("name", Box::new("Grace".to_string())),
        Err(FlowError::UnsupportedMutation { .. })
    ));
    assert_eq!(user.get(), ada());
}

#[test]
fn properties_write_through_their_setter() {
    let field = Arc::new(RwLock::new(ada()));
    let property = Property::new(
        {
            let field = Arc::clone(&field);
            move || field.read().unwrap().clone()
        },
        {
            let field = Arc::clone(&field);
            move |user| *field.write().unwrap() = user
        },
    );

    property
        .set_member("name", Box::new("Grace".to_string()))
        .unwrap();
    assert_eq!(field.read().unwrap().name, "Grace");
}

#[test]
fn chains_forward_to_their_target() {
    let users = vec![Cell::new(ada()), Cell::new(ada())];
    let selected = Cell::new(0_usize);
    let chain = ChainBuilder::new(selected.clone())
        .then_value({
            let users = users.clone();
            move |index| users[index].clone()
        })
        .build();

    selected.set(1);
    chain.set_member("age", Box::new(40_u32)).unwrap();
    assert_eq!(users[0].get().age, 36);
    assert_eq!(users[1].get().age, 40);

    let read_only = ChainBuilder::new(users[0].clone())
        .then(|user: &Cell<User>| user.map(|user| user))
        .build();
    assert_eq!(
        read_only.member("name").unwrap().downcast_ref::<String>(),
        Some(&"Ada".to_string())
    );
    assert!(matches!(
        read_only.set_member("age", Box::new(1_u32)),
        Err(FlowError::UnsupportedMutation { .. })
    ));
}
