//! Host capabilities exposed to scripts
//!
//! A program can only affect the outside world through a [`Host`]: the four
//! visualization operations bound into its scope. Array interception builds on
//! the same trait through [`ElementObserver`], so a read through an intercepted
//! reference behaves like `highlightElement(i)` and a write like
//! `updateArrayData(array)`.

use super::errors::RuntimeError;
use crate::memory::array::ArrayRef;
use crate::memory::value::Value;

/// Operations injected into the program scope
pub trait Host {
    /// `highlightElement(index)`
    fn highlight(&mut self, index: &Value) -> Result<(), RuntimeError>;

    /// `updateArrayData(values)`
    fn update(&mut self, values: &[Value]) -> Result<(), RuntimeError>;

    /// `log(message)`
    fn log(&mut self, message: &str) -> Result<(), RuntimeError>;

    /// `delay(ms)`
    fn delay(&mut self, ms: f64) -> Result<(), RuntimeError>;
}

/// Receives notifications about element access on intercepted arrays
pub trait ElementObserver {
    fn element_read(&mut self, index: usize) -> Result<(), RuntimeError>;
    fn contents_changed(&mut self, array: &ArrayRef) -> Result<(), RuntimeError>;
}

impl<H: Host + ?Sized> ElementObserver for H {
    fn element_read(&mut self, index: usize) -> Result<(), RuntimeError> {
        self.highlight(&Value::Number(index as f64))
    }

    fn contents_changed(&mut self, array: &ArrayRef) -> Result<(), RuntimeError> {
        let values = array.to_vec();
        self.update(&values)
    }
}

/// Array access that reports to an observer when the reference is intercepted
pub struct Intercepted<'a, O: ElementObserver + ?Sized> {
    array: &'a ArrayRef,
    observer: &'a mut O,
}

impl<'a, O: ElementObserver + ?Sized> Intercepted<'a, O> {
    pub fn new(array: &'a ArrayRef, observer: &'a mut O) -> Self {
        Intercepted { array, observer }
    }

    /// Read element `index`; the value is taken before the observer runs
    pub fn get(&mut self, index: usize) -> Result<Value, RuntimeError> {
        let value = self.array.get(index);
        if self.array.is_intercepted() {
            self.observer.element_read(index)?;
        }
        Ok(value)
    }

    pub fn set(&mut self, index: usize, value: Value) -> Result<(), RuntimeError> {
        self.array.set(index, value);
        self.changed()
    }

    pub fn set_len(&mut self, len: usize) -> Result<(), RuntimeError> {
        self.array.set_len(len);
        self.changed()
    }

    pub fn push(&mut self, values: Vec<Value>) -> Result<usize, RuntimeError> {
        let mut len = self.array.len();
        for value in values {
            len = self.array.push(value);
        }
        self.changed()?;
        Ok(len)
    }

    pub fn pop(&mut self) -> Result<Value, RuntimeError> {
        let value = self.array.pop();
        self.changed()?;
        Ok(value)
    }

    fn changed(&mut self) -> Result<(), RuntimeError> {
        if self.array.is_intercepted() {
            self.observer.contents_changed(self.array)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        events: Vec<String>,
    }

    impl Host for Recorder {
        fn highlight(&mut self, index: &Value) -> Result<(), RuntimeError> {
            self.events.push(format!("highlight {}", index));
            Ok(())
        }

        fn update(&mut self, values: &[Value]) -> Result<(), RuntimeError> {
            let printed: Vec<String> = values.iter().map(|v| v.to_string()).collect();
            self.events.push(format!("update {}", printed.join(",")));
            Ok(())
        }

        fn log(&mut self, message: &str) -> Result<(), RuntimeError> {
            self.events.push(format!("log {}", message));
            Ok(())
        }

        fn delay(&mut self, ms: f64) -> Result<(), RuntimeError> {
            self.events.push(format!("delay {}", ms));
            Ok(())
        }
    }

    #[test]
    fn test_intercepted_access_notifies_host() {
        let array = ArrayRef::intercepted(vec![Value::Number(5.0), Value::Number(6.0)]);
        let mut host = Recorder::default();

        let value = Intercepted::new(&array, &mut host).get(1).unwrap();
        Intercepted::new(&array, &mut host)
            .set(0, Value::Number(9.0))
            .unwrap();

        assert_eq!(value.as_number(), Some(6.0));
        assert_eq!(host.events, vec!["highlight 1", "update 9,6"]);
    }

    #[test]
    fn test_plain_access_is_silent() {
        let array = ArrayRef::from_numbers(&[1.0]);
        let mut host = Recorder::default();

        let mut access = Intercepted::new(&array, &mut host);
        access.get(0).unwrap();
        access.push(vec![Value::Number(2.0)]).unwrap();
        access.pop().unwrap();

        assert!(host.events.is_empty());
        assert_eq!(array.len(), 1);
    }
}
