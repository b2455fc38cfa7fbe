//! Types for animating values over time.
//!
//! Animations update [`Dynamic`] values. They are spawned onto an
//! [`Animations`] pool, which the window host advances by explicit elapsed
//! time each frame. No background thread exists: a test (or an embedder with
//! unusual frame pacing) can advance the pool by any amount and observe every
//! intermediate state deterministically.

pub mod easings;

use std::fmt::{self, Debug};
use std::ops::{ControlFlow, Deref};
use std::sync::{Arc, Weak};
use std::time::Duration;

use alot::{LotId, Lots};
use kempt::Set;
use parking_lot::Mutex;

use crate::graphics::Color;
use crate::value::Dynamic;

/// A type that can animate.
pub trait Animate: Send {
    /// Update the animation by progressing the timeline by `elapsed`.
    ///
    /// When the animation is complete, return `ControlFlow::Break` with the
    /// remaining time that was not needed to complete the animation. This is
    /// used in multi-step animations to ensure time is accurately tracked.
    fn animate(&mut self, elapsed: Duration) -> ControlFlow<Duration>;
}

/// A type that can be converted into an animation.
pub trait IntoAnimate: Sized + Send {
    /// The running animation type.
    type Animate: Animate;

    /// Return this change as a running animation.
    fn into_animate(self) -> Self::Animate;

    /// Returns a combined animation that performs `self` and `other` in
    /// sequence.
    fn chain<Other: IntoAnimate>(self, other: Other) -> Chain<Self, Other> {
        Chain::new(self, other)
    }

    /// Invokes `on_complete` after this animation finishes.
    ///
    /// If the animation is cancelled before finishing, `on_complete` is never
    /// invoked.
    fn on_complete<F>(self, on_complete: F) -> Chain<Self, OnComplete>
    where
        F: FnOnce() + Send + 'static,
    {
        self.chain(OnComplete::new(on_complete))
    }
}

/// A type that can convert into `Box<dyn Animate>`.
pub trait BoxAnimate {
    /// Returns the boxed animation.
    fn boxed(self) -> Box<dyn Animate>;
}

impl<T> BoxAnimate for T
where
    T: IntoAnimate + 'static,
{
    fn boxed(self) -> Box<dyn Animate> {
        Box::new(self.into_animate())
    }
}

/// An animation that can be spawned onto an [`Animations`] pool.
pub trait Spawn {
    /// Spawns the animation, returning a handle that tracks it.
    ///
    /// When the returned handle is dropped, the animation is cancelled.
    fn spawn(self, animations: &Animations) -> AnimationHandle;
}

impl<T> Spawn for T
where
    T: BoxAnimate,
{
    fn spawn(self, animations: &Animations) -> AnimationHandle {
        self.boxed().spawn(animations)
    }
}

impl Spawn for Box<dyn Animate> {
    fn spawn(self, animations: &Animations) -> AnimationHandle {
        animations.spawn_boxed(self)
    }
}

/// A pool of running animations, advanced explicitly by elapsed time.
///
/// Cloning the pool returns another handle to the same animations. The pool
/// for a window is advanced by [`Window::advance`](crate::window::Window).
#[derive(Clone, Default)]
pub struct Animations(Arc<Mutex<Animating>>);

impl Animations {
    /// Returns an empty pool.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Advances every running animation by `elapsed`, removing those that
    /// complete.
    ///
    /// Animation steps run while the pool is locked; an [`Animate`]
    /// implementation must not spawn onto or otherwise access the pool it is
    /// running in.
    pub fn advance(&self, elapsed: Duration) {
        let mut state = self.0.lock();
        let state = &mut *state;
        let mut index = 0;
        while index < state.running.len() {
            let id = *state.running.member(index).expect("index in bounds");
            if state.animations[id].animate(elapsed).is_break() {
                state.animations.remove(id);
                state.running.remove_member(index);
            } else {
                index += 1;
            }
        }
    }

    /// Returns the number of animations currently running.
    #[must_use]
    pub fn running(&self) -> usize {
        self.0.lock().running.len()
    }

    fn spawn_boxed(&self, animation: Box<dyn Animate>) -> AnimationHandle {
        let mut state = self.0.lock();
        let id = state.animations.push(animation);
        state.running.insert(id);
        tracing::trace!(running = state.running.len(), "animation spawned");
        AnimationHandle {
            id: Some(id),
            pool: Arc::downgrade(&self.0),
        }
    }

    fn stop(&self, id: LotId) {
        let mut state = self.0.lock();
        state.animations.remove(id);
        state.running.remove(&id);
    }
}

impl Debug for Animations {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Animations")
            .field("running", &self.running())
            .finish()
    }
}

struct Animating {
    animations: Lots<Box<dyn Animate>>,
    running: Set<LotId>,
}

impl Default for Animating {
    fn default() -> Self {
        Self {
            animations: Lots::new(),
            running: Set::new(),
        }
    }
}

/// A handle to a spawned animation. When dropped, the associated animation is
/// cancelled.
#[derive(Default, Debug)]
#[must_use]
pub struct AnimationHandle {
    id: Option<LotId>,
    pool: Weak<Mutex<Animating>>,
}

impl AnimationHandle {
    /// Returns an empty handle that references no animation.
    pub const fn new() -> Self {
        Self {
            id: None,
            pool: Weak::new(),
        }
    }

    /// Cancels the animation immediately.
    ///
    /// This has the same effect as dropping the handle.
    pub fn clear(&mut self) {
        if let (Some(id), Some(pool)) = (self.id.take(), self.pool.upgrade()) {
            Animations(pool).stop(id);
        }
    }

    /// Returns true if the animation this handle points to is still running.
    #[must_use]
    pub fn is_running(&self) -> bool {
        match (self.id, self.pool.upgrade()) {
            (Some(id), Some(pool)) => pool.lock().running.contains(&id),
            _ => false,
        }
    }
}

impl Drop for AnimationHandle {
    fn drop(&mut self) {
        self.clear();
    }
}

/// A pending transition of a [`Dynamic`] to a new value.
#[must_use = "animations are not performed until they are spawned"]
pub struct DynamicTransition<T> {
    /// The dynamic value to change.
    pub dynamic: Dynamic<T>,
    /// The final value.
    pub new_value: T,
}

impl<T> DynamicTransition<T>
where
    T: LinearInterpolate + Clone + PartialEq + Send + 'static,
{
    /// Returns an animation that transitions the dynamic to its new value
    /// over `duration` with linear interpolation.
    pub fn over(self, duration: Duration) -> Animation<T> {
        Animation {
            transition: self,
            duration,
            easing: EasingFunction::default(),
        }
    }
}

/// A change to a [`Dynamic`] over a [`Duration`], interpolated by an
/// [`EasingFunction`].
#[must_use = "animations are not performed until they are spawned"]
pub struct Animation<T> {
    transition: DynamicTransition<T>,
    duration: Duration,
    easing: EasingFunction,
}

impl<T> Animation<T>
where
    T: LinearInterpolate + Clone + PartialEq + Send + 'static,
{
    /// Replaces the easing used by this animation.
    pub fn with_easing(mut self, easing: impl Into<EasingFunction>) -> Self {
        self.easing = easing.into();
        self
    }
}

impl<T> IntoAnimate for Animation<T>
where
    T: LinearInterpolate + Clone + PartialEq + Send + 'static,
{
    type Animate = RunningAnimation<T>;

    fn into_animate(self) -> Self::Animate {
        RunningAnimation {
            start: self.transition.dynamic.get(),
            animation: self,
            elapsed: Duration::ZERO,
        }
    }
}

/// An [`Animation`] in progress. The starting value for interpolation is
/// captured when the animation starts running.
pub struct RunningAnimation<T> {
    animation: Animation<T>,
    start: T,
    elapsed: Duration,
}

impl<T> Animate for RunningAnimation<T>
where
    T: LinearInterpolate + Clone + PartialEq + Send + 'static,
{
    fn animate(&mut self, elapsed: Duration) -> ControlFlow<Duration> {
        self.elapsed = self.elapsed.checked_add(elapsed).unwrap_or(Duration::MAX);

        if let Some(remaining_elapsed) = self.elapsed.checked_sub(self.animation.duration) {
            self.animation
                .transition
                .dynamic
                .set(self.animation.transition.new_value.clone());
            ControlFlow::Break(remaining_elapsed)
        } else {
            let progress = self.animation.easing.ease(ZeroToOne::new(
                self.elapsed.as_secs_f32() / self.animation.duration.as_secs_f32(),
            ));
            self.animation
                .transition
                .dynamic
                .set(self.start.lerp(&self.animation.transition.new_value, progress));
            ControlFlow::Continue(())
        }
    }
}

impl IntoAnimate for Duration {
    type Animate = RunningDelay;

    fn into_animate(self) -> Self::Animate {
        RunningDelay { remaining: self }
    }
}

/// A [`Duration`] being used as a delay step in an animation.
#[derive(Debug)]
pub struct RunningDelay {
    remaining: Duration,
}

impl Animate for RunningDelay {
    fn animate(&mut self, elapsed: Duration) -> ControlFlow<Duration> {
        if let Some(leftover) = elapsed.checked_sub(self.remaining) {
            self.remaining = Duration::ZERO;
            ControlFlow::Break(leftover)
        } else {
            self.remaining -= elapsed;
            ControlFlow::Continue(())
        }
    }
}

/// An animation step that invokes a callback once when it is reached.
#[must_use = "animations are not performed until they are spawned"]
pub struct OnComplete(Option<Box<dyn FnOnce() + Send>>);

impl OnComplete {
    /// Returns a step that invokes `callback` when reached.
    pub fn new<F>(callback: F) -> Self
    where
        F: FnOnce() + Send + 'static,
    {
        Self(Some(Box::new(callback)))
    }
}

impl IntoAnimate for OnComplete {
    type Animate = Self;

    fn into_animate(self) -> Self::Animate {
        self
    }
}

impl Animate for OnComplete {
    fn animate(&mut self, elapsed: Duration) -> ControlFlow<Duration> {
        if let Some(callback) = self.0.take() {
            callback();
        }
        ControlFlow::Break(elapsed)
    }
}

/// An animation combinator that runs animation `A`, then animation `B`.
#[must_use = "animations are not performed until they are spawned"]
pub struct Chain<A: IntoAnimate, B: IntoAnimate>(A, B);

impl<A, B> Chain<A, B>
where
    A: IntoAnimate,
    B: IntoAnimate,
{
    /// Returns a new instance with `first` and `second`.
    pub const fn new(first: A, second: B) -> Self {
        Self(first, second)
    }
}

impl<A, B> IntoAnimate for Chain<A, B>
where
    A: IntoAnimate,
    B: IntoAnimate,
{
    type Animate = RunningChain<A, B>;

    fn into_animate(self) -> Self::Animate {
        RunningChain(Some(ChainState::AnimatingFirst(self.0.into_animate(), self.1)))
    }
}

/// A [`Chain`] that is currently animating.
pub struct RunningChain<A: IntoAnimate, B: IntoAnimate>(Option<ChainState<A, B>>);

enum ChainState<A: IntoAnimate, B: IntoAnimate> {
    AnimatingFirst(A::Animate, B),
    AnimatingSecond(B::Animate),
}

impl<A, B> Animate for RunningChain<A, B>
where
    A: IntoAnimate,
    B: IntoAnimate,
{
    fn animate(&mut self, elapsed: Duration) -> ControlFlow<Duration> {
        match self.0.as_mut().expect("invalid state") {
            ChainState::AnimatingFirst(a, _) => match a.animate(elapsed) {
                ControlFlow::Continue(()) => ControlFlow::Continue(()),
                ControlFlow::Break(remaining) => {
                    let Some(ChainState::AnimatingFirst(_, b)) = self.0.take() else {
                        unreachable!("invalid state")
                    };
                    self.0 = Some(ChainState::AnimatingSecond(b.into_animate()));
                    self.animate(remaining)
                }
            },
            ChainState::AnimatingSecond(b) => b.animate(elapsed),
        }
    }
}

/// Performs a linear interpolation between two values.
pub trait LinearInterpolate {
    /// Interpolate linearly between `self` and `target` using `percent`.
    #[must_use]
    fn lerp(&self, target: &Self, percent: f32) -> Self;
}

impl LinearInterpolate for f32 {
    fn lerp(&self, target: &Self, percent: f32) -> Self {
        self + (target - self) * percent
    }
}

macro_rules! impl_lerp_via_f64 {
    ($($type:ty),+) => {
        $(
            impl LinearInterpolate for $type {
                #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                fn lerp(&self, target: &Self, percent: f32) -> Self {
                    let start = *self as f64;
                    let delta = *target as f64 - start;
                    (start + delta * f64::from(percent)).round() as $type
                }
            }
        )+
    };
}

impl_lerp_via_f64!(u8, u16, u32, i8, i16, i32, usize);

impl LinearInterpolate for Color {
    fn lerp(&self, target: &Self, percent: f32) -> Self {
        Color::new(
            self.red().lerp(&target.red(), percent),
            self.green().lerp(&target.green(), percent),
            self.blue().lerp(&target.blue(), percent),
            self.alpha().lerp(&target.alpha(), percent),
        )
    }
}

/// An `f32` clamped between 0.0 and 1.0 that cannot be NaN.
///
/// Because of these restrictions, this type implements `Ord` and `Eq`.
#[derive(Clone, Copy, Debug)]
pub struct ZeroToOne(f32);

impl ZeroToOne {
    /// The maximum value this type can contain.
    pub const ONE: Self = Self(1.);
    /// The minimum value this type can contain.
    pub const ZERO: Self = Self(0.);

    /// Returns a new instance after clamping `value` between +0.0 and 1.0.
    ///
    /// # Panics
    ///
    /// This function panics if `value` is not a number.
    #[must_use]
    pub fn new(value: f32) -> Self {
        assert!(!value.is_nan());

        Self(value.clamp(0., 1.))
    }

    /// Returns the contained floating point value.
    #[must_use]
    pub fn into_f32(self) -> f32 {
        self.0
    }

    /// Returns the result of subtracting this value from 1.0.
    #[must_use]
    pub fn one_minus(self) -> Self {
        Self(1. - self.0)
    }
}

impl Default for ZeroToOne {
    fn default() -> Self {
        Self::ZERO
    }
}

impl Deref for ZeroToOne {
    type Target = f32;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl Eq for ZeroToOne {}

impl PartialEq for ZeroToOne {
    fn eq(&self, other: &Self) -> bool {
        (self.0 - other.0).abs() < f32::EPSILON
    }
}

impl Ord for ZeroToOne {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.0.total_cmp(&other.0)
    }
}

impl PartialOrd for ZeroToOne {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl LinearInterpolate for ZeroToOne {
    fn lerp(&self, target: &Self, percent: f32) -> Self {
        ZeroToOne::new(self.0 + (target.0 - self.0) * percent)
    }
}

/// Performs easing for value interpolation.
pub trait Easing: Debug + Send + Sync {
    /// Eases `progress`, returning a ratio that may extend beyond 0.0..=1.0
    /// for overshooting curves.
    fn ease(&self, progress: ZeroToOne) -> f32;
}

/// A cloneable, dynamically typed [`Easing`] implementation.
#[derive(Clone, Debug)]
pub enum EasingFunction {
    /// Eases via a function pointer.
    Fn(fn(ZeroToOne) -> f32),
    /// Eases via a shared [`Easing`] implementation.
    Custom(Arc<dyn Easing>),
}

impl EasingFunction {
    /// Eases `progress` using the contained implementation.
    #[must_use]
    pub fn ease(&self, progress: ZeroToOne) -> f32 {
        match self {
            EasingFunction::Fn(func) => func(progress),
            EasingFunction::Custom(easing) => easing.ease(progress),
        }
    }
}

impl Default for EasingFunction {
    fn default() -> Self {
        Self::from(easings::Linear)
    }
}

impl<T> From<T> for EasingFunction
where
    T: Easing + 'static,
{
    fn from(easing: T) -> Self {
        Self::Custom(Arc::new(easing))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::easings::Linear;
    use super::*;

    #[test]
    fn lerps() {
        #[track_caller]
        fn test_lerp<T: LinearInterpolate + Debug + PartialEq>(a: T, b: T, mid: T) {
            assert_eq!(a.lerp(&b, 0.), a);
            assert_eq!(a.lerp(&b, 1.), b);
            assert_eq!(a.lerp(&b, 0.5), mid);
        }

        test_lerp(0_u8, 255, 128);
        test_lerp(0_i32, -50, -25);
        test_lerp(0_f32, 10., 5.);
        test_lerp(
            Color::new(0, 0, 0, 0),
            Color::new(255, 255, 255, 255),
            Color::new(128, 128, 128, 128),
        );
    }

    #[test]
    fn zero_to_one_clamps() {
        assert_eq!(ZeroToOne::new(-1.), ZeroToOne::ZERO);
        assert_eq!(ZeroToOne::new(2.), ZeroToOne::ONE);
        assert_eq!(ZeroToOne::new(0.25).one_minus(), ZeroToOne::new(0.75));
    }

    #[test]
    fn transition_interpolates() {
        let animations = Animations::new();
        let value = Dynamic::new(0_u8);
        let handle = value
            .transition_to(100)
            .over(Duration::from_millis(100))
            .with_easing(Linear)
            .spawn(&animations);

        animations.advance(Duration::from_millis(50));
        assert_eq!(value.get(), 50);
        assert!(handle.is_running());

        animations.advance(Duration::from_millis(50));
        assert_eq!(value.get(), 100);
        assert!(!handle.is_running());
        assert_eq!(animations.running(), 0);
    }

    #[test]
    fn chained_delay_and_completion() {
        let animations = Animations::new();
        let completions = Arc::new(AtomicUsize::new(0));
        let handle = Duration::from_millis(100)
            .on_complete({
                let completions = completions.clone();
                move || {
                    completions.fetch_add(1, Ordering::Relaxed);
                }
            })
            .spawn(&animations);

        animations.advance(Duration::from_millis(99));
        assert_eq!(completions.load(Ordering::Relaxed), 0);
        // The delay's leftover time flows into the completion step.
        animations.advance(Duration::from_millis(2));
        assert_eq!(completions.load(Ordering::Relaxed), 1);
        assert_eq!(animations.running(), 0);
        drop(handle);
    }

    #[test]
    fn dropping_handle_cancels() {
        let animations = Animations::new();
        let completions = Arc::new(AtomicUsize::new(0));
        let handle = Duration::from_millis(100)
            .on_complete({
                let completions = completions.clone();
                move || {
                    completions.fetch_add(1, Ordering::Relaxed);
                }
            })
            .spawn(&animations);

        animations.advance(Duration::from_millis(50));
        drop(handle);
        assert_eq!(animations.running(), 0);
        animations.advance(Duration::from_millis(100));
        assert_eq!(completions.load(Ordering::Relaxed), 0);
    }
}
