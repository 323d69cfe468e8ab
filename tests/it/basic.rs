use std::sync::Arc;

use callrec::*;
use pretty_assertions::assert_eq;

#[derive(Clone, Debug, PartialEq)]
struct User {
    name: String,
}

#[derive(Debug)]
struct Thing {
    name: String,
}

trait TestProtocol {
    fn int_result(&self, arg1: String, arg2: i32) -> i32;
    fn string_result(&self, arg1: String, arg2: i32) -> String;
    fn struct_result(&self, arg1: String, arg2: i32) -> User;
    fn shared_result(&self, arg1: String, arg2: i32) -> Arc<Thing>;

    fn optional_int_result(&self, arg1: String, arg2: i32) -> Option<i32>;
    fn optional_struct_result(&self, arg1: String, arg2: i32) -> Option<User>;

    fn int_result_or_default(&self, arg1: String, arg2: i32) -> i32;

    fn void_result(&self, arg1: String, arg2: i32);
}

struct TestMock {
    mock: Mock,
    int_result_ref: MockRef<(String, i32), i32>,
    string_result_ref: MockRef<(String, i32), String>,
    struct_result_ref: MockRef<(String, i32), User>,
    shared_result_ref: MockRef<(String, i32), Arc<Thing>>,
    optional_int_result_ref: MockRef<(String, i32), Option<i32>>,
    optional_struct_result_ref: MockRef<(String, i32), Option<User>>,
    int_result_or_default_ref: MockRef<(String, i32), i32>,
    void_result_ref: MockRef<(String, i32), ()>,
}

impl TestMock {
    fn new() -> Self {
        Self {
            mock: Mock::new(),
            int_result_ref: MockRef::new(<Self as TestProtocol>::int_result),
            string_result_ref: MockRef::new(<Self as TestProtocol>::string_result),
            struct_result_ref: MockRef::new(<Self as TestProtocol>::struct_result),
            shared_result_ref: MockRef::new(<Self as TestProtocol>::shared_result),
            optional_int_result_ref: MockRef::new(<Self as TestProtocol>::optional_int_result),
            optional_struct_result_ref: MockRef::new(
                <Self as TestProtocol>::optional_struct_result,
            ),
            int_result_or_default_ref: MockRef::new(<Self as TestProtocol>::int_result_or_default),
            void_result_ref: MockRef::new(<Self as TestProtocol>::void_result),
        }
    }
}

impl Mockable for TestMock {
    fn mock(&self) -> &Mock {
        &self.mock
    }
}

impl TestProtocol for TestMock {
    fn int_result(&self, arg1: String, arg2: i32) -> i32 {
        self.invoke(&self.int_result_ref, (arg1, arg2))
    }

    fn string_result(&self, arg1: String, arg2: i32) -> String {
        self.invoke(&self.string_result_ref, (arg1, arg2))
    }

    fn struct_result(&self, arg1: String, arg2: i32) -> User {
        self.invoke(&self.struct_result_ref, (arg1, arg2))
    }

    fn shared_result(&self, arg1: String, arg2: i32) -> Arc<Thing> {
        self.invoke(&self.shared_result_ref, (arg1, arg2))
    }

    fn optional_int_result(&self, arg1: String, arg2: i32) -> Option<i32> {
        self.invoke_optional(&self.optional_int_result_ref, (arg1, arg2))
    }

    fn optional_struct_result(&self, arg1: String, arg2: i32) -> Option<User> {
        self.invoke_optional(&self.optional_struct_result_ref, (arg1, arg2))
    }

    fn int_result_or_default(&self, arg1: String, arg2: i32) -> i32 {
        self.invoke_or(&self.int_result_or_default_ref, (arg1, arg2), -1)
    }

    fn void_result(&self, arg1: String, arg2: i32) {
        self.invoke(&self.void_result_ref, (arg1, arg2))
    }
}

#[test]
fn non_optional_results_of_different_types() {
    let mock = TestMock::new();
    let user = User {
        name: "a user".to_string(),
    };
    let thing = Arc::new(Thing {
        name: "a thing".to_string(),
    });

    mock.register_result(&mock.int_result_ref, |_| 123);
    mock.register_result(&mock.string_result_ref, |_| "a string".to_string());
    mock.register_result(&mock.struct_result_ref, {
        let user = user.clone();
        move |_| user.clone()
    });
    mock.register_result(&mock.shared_result_ref, {
        let thing = thing.clone();
        move |_| thing.clone()
    });

    assert_eq!(123, mock.int_result("abc".to_string(), 123));
    assert_eq!("a string", mock.string_result("abc".to_string(), 123));
    assert_eq!(user, mock.struct_result("abc".to_string(), 123));

    let shared = mock.shared_result("abc".to_string(), 123);
    assert!(Arc::ptr_eq(&thing, &shared));
    assert_eq!("a thing", shared.name);
}

#[test]
fn results_can_depend_on_arguments() {
    let mock = TestMock::new();

    mock.register_result(&mock.int_result_ref, |(_, arg2)| *arg2);
    mock.register_result(&mock.string_result_ref, |(arg1, _)| arg1.clone());

    assert_eq!(123, mock.int_result("abc".to_string(), 123));
    assert_eq!(456, mock.int_result("abc".to_string(), 456));
    assert_eq!("abc", mock.string_result("abc".to_string(), 123));
    assert_eq!("def", mock.string_result("def".to_string(), 123));
}

#[test]
fn calls_are_recorded_in_order_with_arguments_and_results() {
    let mock = TestMock::new();

    mock.register_result(&mock.int_result_ref, |(_, arg2)| arg2 * 2);
    mock.register_result(&mock.string_result_ref, |(arg1, _)| arg1.to_uppercase());

    mock.int_result("abc".to_string(), 123);
    mock.int_result("abc".to_string(), 456);
    mock.int_result("abc".to_string(), 789);
    mock.string_result("abc".to_string(), 123);
    mock.string_result("def".to_string(), 123);

    let int_calls = mock.calls(&mock.int_result_ref);
    let string_calls = mock.calls(&mock.string_result_ref);

    assert_eq!(3, int_calls.len());
    assert_eq!(2, string_calls.len());

    assert_eq!(
        vec![
            ("abc".to_string(), 123),
            ("abc".to_string(), 456),
            ("abc".to_string(), 789),
        ],
        int_calls
            .iter()
            .map(|call| call.arguments.clone())
            .collect::<Vec<_>>()
    );
    assert_eq!(
        vec![Some(246), Some(912), Some(1578)],
        int_calls.iter().map(|call| call.result).collect::<Vec<_>>()
    );
    assert_eq!(("def".to_string(), 123), string_calls[1].arguments);
    assert_eq!(Some("DEF".to_string()), string_calls[1].result);
}

#[test]
fn optional_results_are_none_without_registration() {
    let mock = TestMock::new();

    assert_eq!(None, mock.optional_int_result("abc".to_string(), 123));
    assert_eq!(None, mock.optional_struct_result("abc".to_string(), 123));

    let calls = mock.calls(&mock.optional_int_result_ref);
    assert_eq!(1, calls.len());
    assert_eq!(Some(None), calls[0].result);
}

#[test]
fn optional_results_use_registered_producer() {
    let mock = TestMock::new();

    mock.register_result(&mock.optional_int_result_ref, |(_, arg2)| Some(*arg2));
    mock.register_result(&mock.optional_struct_result_ref, |(arg1, _)| {
        Some(User { name: arg1.clone() })
    });

    assert_eq!(Some(123), mock.optional_int_result("abc".to_string(), 123));
    assert_eq!(
        Some(User {
            name: "abc".to_string()
        }),
        mock.optional_struct_result("abc".to_string(), 123)
    );
    assert_eq!(
        Some(Some(123)),
        mock.calls(&mock.optional_int_result_ref)[0].result
    );
}

#[test]
fn fallback_is_used_only_without_registration() {
    let mock = TestMock::new();

    assert_eq!(-1, mock.int_result_or_default("abc".to_string(), 123));

    mock.register_result(&mock.int_result_or_default_ref, |(_, arg2)| *arg2);
    assert_eq!(123, mock.int_result_or_default("abc".to_string(), 123));

    let results: Vec<_> = mock
        .calls(&mock.int_result_or_default_ref)
        .iter()
        .map(|call| call.result)
        .collect();
    assert_eq!(vec![Some(-1), Some(123)], results);
}

#[test]
fn void_functions_need_no_registration() {
    let mock = TestMock::new();

    mock.void_result("abc".to_string(), 123);
    mock.void_result("abc".to_string(), 456);
    mock.void_result("abc".to_string(), 789);

    assert!(mock.has_been_called(&mock.void_result_ref));
    assert!(mock.has_been_called_times(&mock.void_result_ref, 3));
    assert!(!mock.has_been_called_times(&mock.void_result_ref, 2));

    let calls = mock.calls(&mock.void_result_ref);
    assert_eq!(("abc".to_string(), 456), calls[1].arguments);
    assert_eq!(Some(()), calls[1].result);
}

#[test]
fn void_functions_never_consult_a_producer() {
    let mock = TestMock::new();
    let consulted = Arc::new(std::sync::atomic::AtomicBool::new(false));

    mock.register_result(&mock.void_result_ref, {
        let consulted = consulted.clone();
        move |_| consulted.store(true, std::sync::atomic::Ordering::SeqCst)
    });
    mock.void_result("abc".to_string(), 1);

    assert!(!consulted.load(std::sync::atomic::Ordering::SeqCst));
    assert_eq!(1, mock.call_count(&mock.void_result_ref));
}

#[test]
fn uncalled_function_has_no_calls() {
    let mock = TestMock::new();

    assert!(mock.calls(&mock.int_result_ref).is_empty());
    assert!(!mock.has_been_called(&mock.int_result_ref));
    assert!(mock.has_been_called_times(&mock.int_result_ref, 0));
}

#[test]
fn reregistration_replaces_producer() {
    let mock = TestMock::new();

    mock.register_result(&mock.int_result_ref, |_| 1);
    mock.register_result(&mock.int_result_ref, |_| 2);

    assert_eq!(2, mock.int_result("abc".to_string(), 0));
    assert!(mock.has_been_called_times(&mock.int_result_ref, 1));
}

fn greet(name: String, age: i32) -> String {
    format!("{name} ({age})")
}

fn increment(n: i32) -> i32 {
    n + 1
}

#[test]
fn scenario_reversed_name() {
    let mock = Mock::new();
    let greet_ref = MockRef::<(String, i32), String>::new(greet).named("Greeter::greet");

    mock.register_result(&greet_ref, |(name, _)| name.chars().rev().collect());

    assert_eq!("adA", mock.invoke(&greet_ref, ("Ada".to_string(), 30)));
    assert_eq!("oB", mock.invoke(&greet_ref, ("Bo".to_string(), 5)));

    let calls = mock.calls(&greet_ref);
    assert_eq!(2, calls.len());
    assert_eq!(("Ada".to_string(), 30), calls[0].arguments);
    assert_eq!(Some("adA".to_string()), calls[0].result);
    assert_eq!(("Bo".to_string(), 5), calls[1].arguments);
    assert_eq!(Some("oB".to_string()), calls[1].result);
}

#[test]
fn scenario_fallback_without_registration() {
    let mock = Mock::new();
    let greet_ref = MockRef::<(String, i32), String>::new(greet).named("Greeter::greet");

    assert_eq!(
        "x",
        mock.invoke_or(&greet_ref, ("Ada".to_string(), 30), "x".to_string())
    );
    assert_eq!(Some("x".to_string()), mock.calls(&greet_ref)[0].result);
}

#[test]
fn lazy_fallback_is_only_computed_when_needed() {
    let mock = Mock::new();
    let r = MockRef::<i32, i32>::new(increment);

    mock.register_result(&r, |n| n + 1);

    assert_eq!(
        2,
        mock.invoke_or_else(&r, 1, || panic!("fallback should not be computed"))
    );
}
