use crate::ast::{BinaryOp, Expr, LogicalOp, Program, Stmt, UnaryOp};
use crate::error::SetkerError;
use crate::value::{Function, Value};
use std::cell::RefCell;
use std::collections::HashMap;
use std::io::Write;
use std::rc::Rc;
use std::time::{SystemTime, UNIX_EPOCH};

/// One lexical scope: name bindings plus a handle to the enclosing frame.
/// Frames are shared, never copied — a closure holds its defining frame
/// alive and observes every later mutation made through it.
pub struct Environment {
    values: RefCell<HashMap<String, Value>>,
    enclosing: Option<Rc<Environment>>,
}

impl Environment {
    pub fn new() -> Rc<Self> {
        Rc::new(Self {
            values: RefCell::new(HashMap::new()),
            enclosing: None,
        })
    }

    pub fn with_enclosing(enclosing: Rc<Environment>) -> Rc<Self> {
        Rc::new(Self {
            values: RefCell::new(HashMap::new()),
            enclosing: Some(enclosing),
        })
    }

    /// Always writes the current frame. Redefinition overwrites silently.
    pub fn define(&self, name: &str, value: Value) {
        self.values.borrow_mut().insert(name.to_string(), value);
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        match self.values.borrow().get(name) {
            Some(value) => Some(value.clone()),
            None => self.enclosing.as_ref().and_then(|parent| parent.get(name)),
        }
    }

    /// Walks outward to the defining frame. Returns false when no enclosing
    /// frame defines the name.
    pub fn assign(&self, name: &str, value: Value) -> bool {
        if self.values.borrow().contains_key(name) {
            self.values.borrow_mut().insert(name.to_string(), value);
            true
        } else {
            match &self.enclosing {
                Some(parent) => parent.assign(name, value),
                None => false,
            }
        }
    }
}

/// How a statement finished: normally, with its value, or unwinding a
/// `return` toward the enclosing call.
enum Flow {
    Normal(Value),
    Return(Value),
}

pub struct Evaluator<'a, W: Write> {
    output: &'a mut W,
    globals: Rc<Environment>,
}

impl<'a, W: Write> Evaluator<'a, W> {
    pub fn new(output: &'a mut W) -> Self {
        Self {
            output,
            globals: Environment::new(),
        }
    }

    /// Executes the whole program and returns the last statement's value,
    /// which is what the evaluate mode prints. A top-level `return` ends
    /// the program with its value.
    pub fn evaluate_program(&mut self, program: &Program) -> Result<Value, SetkerError> {
        let globals = self.globals.clone();
        match self.execute_statements(&program.statements, &globals)? {
            Flow::Normal(value) => Ok(value),
            Flow::Return(value) => Ok(value),
        }
    }

    /// Runs a statement list in order. A runtime error unwinding out of
    /// statement i gets the synthetic `[line i+1]` suffix appended here —
    /// the index within this list, not a source line.
    fn execute_statements(
        &mut self,
        statements: &[Stmt],
        env: &Rc<Environment>,
    ) -> Result<Flow, SetkerError> {
        let mut last = Value::Nil;
        for (index, stmt) in statements.iter().enumerate() {
            match self.execute(stmt, env) {
                Ok(Flow::Normal(value)) => last = value,
                Ok(Flow::Return(value)) => return Ok(Flow::Return(value)),
                Err(e) => return Err(e.with_statement_line(index + 1)),
            }
        }
        Ok(Flow::Normal(last))
    }

    fn execute(&mut self, stmt: &Stmt, env: &Rc<Environment>) -> Result<Flow, SetkerError> {
        match stmt {
            Stmt::Expression(expr) => Ok(Flow::Normal(self.evaluate(expr, env)?)),
            Stmt::Print(expr) => {
                let value = self.evaluate(expr, env)?;
                writeln!(self.output, "{}", value)
                    .map_err(|e| SetkerError::runtime_error(format!("I/O error: {}", e)))?;
                Ok(Flow::Normal(Value::Nil))
            }
            Stmt::VarDecl { name, initializer } => {
                let value = match initializer {
                    Some(expr) => self.evaluate(expr, env)?,
                    None => Value::Nil,
                };
                env.define(name, value.clone());
                Ok(Flow::Normal(value))
            }
            Stmt::Block(statements) => {
                let local = Environment::with_enclosing(env.clone());
                self.execute_statements(statements, &local)
            }
            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                if self.evaluate(condition, env)?.is_truthy() {
                    self.execute(then_branch, env)
                } else if let Some(else_stmt) = else_branch {
                    self.execute(else_stmt, env)
                } else {
                    Ok(Flow::Normal(Value::Nil))
                }
            }
            Stmt::While { condition, body } => {
                while self.evaluate(condition, env)?.is_truthy() {
                    if let Flow::Return(value) = self.execute(body, env)? {
                        return Ok(Flow::Return(value));
                    }
                }
                Ok(Flow::Normal(Value::Nil))
            }
            Stmt::Function { name, params, body } => {
                let function = Value::Function(Rc::new(Function {
                    name: name.clone(),
                    params: params.clone(),
                    body: (**body).clone(),
                    closure: env.clone(),
                }));
                env.define(name, function.clone());
                Ok(Flow::Normal(function))
            }
            Stmt::Return(expr) => {
                let value = match expr {
                    Some(expr) => self.evaluate(expr, env)?,
                    None => Value::Nil,
                };
                Ok(Flow::Return(value))
            }
        }
    }

    fn evaluate(&mut self, expr: &Expr, env: &Rc<Environment>) -> Result<Value, SetkerError> {
        match expr {
            Expr::Number(n) => Ok(Value::Number(*n)),
            Expr::String(s) => Ok(Value::String(s.clone())),
            Expr::Boolean(b) => Ok(Value::Bool(*b)),
            Expr::Nil => Ok(Value::Nil),
            Expr::Variable(name) => env.get(name).ok_or_else(|| {
                SetkerError::runtime_error(format!("Undefined variable '{}'.", name))
            }),
            Expr::Assign { name, value } => {
                let value = self.evaluate(value, env)?;
                if !env.assign(name, value.clone()) {
                    return Err(SetkerError::runtime_error(format!(
                        "Undefined variable '{}'.",
                        name
                    )));
                }
                Ok(value)
            }
            Expr::Logical {
                left,
                operator,
                right,
            } => {
                let left = self.evaluate(left, env)?;
                match operator {
                    LogicalOp::Or if left.is_truthy() => Ok(left),
                    LogicalOp::And if !left.is_truthy() => Ok(left),
                    _ => self.evaluate(right, env),
                }
            }
            Expr::Unary { operator, operand } => {
                let operand = self.evaluate(operand, env)?;
                match operator {
                    UnaryOp::Not => Ok(Value::Bool(!operand.is_truthy())),
                    UnaryOp::Negate => match operand {
                        Value::Number(n) => Ok(Value::Number(-n)),
                        _ => Err(SetkerError::runtime_error(
                            "Operand must be a number.".to_string(),
                        )),
                    },
                }
            }
            Expr::Binary {
                left,
                operator,
                right,
            } => {
                let left = self.evaluate(left, env)?;
                let right = self.evaluate(right, env)?;
                evaluate_binary_op(*operator, left, right)
            }
            Expr::Grouping(inner) => self.evaluate(inner, env),
            Expr::Call { callee, args } => self.call(callee, args, env),
        }
    }

    fn call(
        &mut self,
        name: &str,
        args: &[Expr],
        env: &Rc<Environment>,
    ) -> Result<Value, SetkerError> {
        // The native clock is resolved before the environment, so it cannot
        // be shadowed. It ignores its arguments without evaluating them.
        if name == "clock" {
            let seconds = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|d| d.as_secs() as f64)
                .unwrap_or(0.0);
            return Ok(Value::Number(seconds));
        }

        let callee = env.get(name).ok_or_else(|| {
            SetkerError::runtime_error(format!("Undefined variable '{}'.", name))
        })?;

        let function = match callee {
            Value::Function(f) => f,
            _ => {
                return Err(SetkerError::runtime_error(format!(
                    "Attempt to call non-function '{}'.",
                    name
                )))
            }
        };

        if args.len() != function.params.len() {
            return Err(SetkerError::runtime_error(format!(
                "Expected {} args but got {}.",
                function.params.len(),
                args.len()
            )));
        }

        // Arguments evaluate left-to-right in the caller's environment; the
        // call frame chains to the function's captured one.
        let frame = Environment::with_enclosing(function.closure.clone());
        for (param, arg) in function.params.iter().zip(args) {
            let value = self.evaluate(arg, env)?;
            frame.define(param, value);
        }

        match self.execute(&function.body, &frame)? {
            Flow::Return(value) => Ok(value),
            Flow::Normal(_) => Ok(Value::Nil),
        }
    }
}

fn evaluate_binary_op(operator: BinaryOp, left: Value, right: Value) -> Result<Value, SetkerError> {
    match operator {
        BinaryOp::Add => match (left, right) {
            (Value::String(l), Value::String(r)) => Ok(Value::String(l + &r)),
            (Value::String(l), r @ (Value::Number(_) | Value::Bool(_) | Value::Nil)) => {
                Ok(Value::String(format!("{}{}", l, r)))
            }
            (l @ (Value::Number(_) | Value::Bool(_) | Value::Nil), Value::String(r)) => {
                Ok(Value::String(format!("{}{}", l, r)))
            }
            (Value::Number(l), Value::Number(r)) => Ok(Value::Number(l + r)),
            _ => Err(operands_must_be_numbers()),
        },
        BinaryOp::Subtract => numeric_op(left, right, |l, r| l - r),
        BinaryOp::Multiply => numeric_op(left, right, |l, r| l * r),
        // No zero check: IEEE division yields inf or nan
        BinaryOp::Divide => numeric_op(left, right, |l, r| l / r),
        // Remainder keeps the dividend's sign
        BinaryOp::Modulo => numeric_op(left, right, |l, r| l % r),
        BinaryOp::Equal => Ok(Value::Bool(left == right)),
        BinaryOp::NotEqual => Ok(Value::Bool(left != right)),
        BinaryOp::Less => comparison_op(left, right, |l, r| l < r),
        BinaryOp::LessEqual => comparison_op(left, right, |l, r| l <= r),
        BinaryOp::Greater => comparison_op(left, right, |l, r| l > r),
        BinaryOp::GreaterEqual => comparison_op(left, right, |l, r| l >= r),
    }
}

fn numeric_op(left: Value, right: Value, op: fn(f64, f64) -> f64) -> Result<Value, SetkerError> {
    match (left, right) {
        (Value::Number(l), Value::Number(r)) => Ok(Value::Number(op(l, r))),
        _ => Err(operands_must_be_numbers()),
    }
}

fn comparison_op(left: Value, right: Value, op: fn(f64, f64) -> bool) -> Result<Value, SetkerError> {
    match (left, right) {
        (Value::Number(l), Value::Number(r)) => Ok(Value::Bool(op(l, r))),
        _ => Err(operands_must_be_numbers()),
    }
}

fn operands_must_be_numbers() -> SetkerError {
    SetkerError::runtime_error("Operands must be numbers.".to_string())
}
